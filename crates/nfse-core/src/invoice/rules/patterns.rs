//! Common regex patterns for NFS-e extraction.
//!
//! Labels are matched case-insensitively and accent-tolerantly; captured values
//! keep their case as written. Page text arrives flattened to one line per page,
//! so labeled patterns must not rely on line breaks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice number patterns
    pub static ref NUMBER_OF_NOTE: Regex = Regex::new(
        r"(?i)n[úu]mero\s+d[ao]\s+(?:nota(?:\s+fiscal)?|nfs-?e)\s*[:.]?\s*(\d+)(?:[^\d/:]|$)"
    ).unwrap();

    pub static ref NFSE_NUMBER: Regex = Regex::new(
        r"(?i)\bnfs-?e\b\s*(?:n[º°o]?\.?\s*)?[:\-]?\s*(\d+)(?:[^\d/:]|$)"
    ).unwrap();

    pub static ref NOTA_FISCAL_NUMBER: Regex = Regex::new(
        r"(?i)nota\s+fiscal(?:\s+de\s+servi[çc]os?(?:\s+eletr[ôo]nica)?)?\s*(?:n[º°o]?\.?\s*)?:?\s*(\d+)(?:[^\d/:]|$)"
    ).unwrap();

    // Parts of a date or time ("15/09/2025", "10:22") are not runs
    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"(?:^|[^\w/:])(\d{4,})(?:[^\w/:]|$)"
    ).unwrap();

    // File names glue numbers to words ("nfse_004512.pdf"), so no boundaries
    pub static ref FILE_NAME_DIGITS: Regex = Regex::new(
        r"\d{4,}"
    ).unwrap();

    // Amount patterns (Brazilian format: 2.500,00)
    pub static ref AMOUNT_VALUE_LABEL: Regex = Regex::new(
        r"(?i)valor\s+(?:total|l[íi]quido|bruto|d[oa]s?\s+servi[çc]os?|d[oa]s?\s+nota)(?:\s+d[aoe]s?\s+(?:nota|servi[çc]os?|nfs-?e))?\s*(?:\(R\$\))?\s*[:=]?\s*(?:R\$\s*)?(\d{1,3}(?:\.\d{3})+,\d{2}|\d+,\d{2})\b"
    ).unwrap();

    pub static ref AMOUNT_TOTAL_LABEL: Regex = Regex::new(
        r"(?i)total\s+(?:a\s+pagar|geral|da\s+nota)\s*[:=]?\s*(?:R\$\s*)?(\d{1,3}(?:\.\d{3})+,\d{2}|\d+,\d{2})\b"
    ).unwrap();

    pub static ref AMOUNT_WITH_CURRENCY: Regex = Regex::new(
        r"R\$\s*(\d{1,3}(?:\.\d{3})+,\d{2}|\d+,\d{2})\b"
    ).unwrap();

    pub static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"\b(\d{1,3}(?:\.\d{3})+,\d{2}|\d+,\d{2})\b"
    ).unwrap();

    // Date patterns
    pub static ref ISSUE_DATE: Regex = Regex::new(
        r"(?i)(?:data\s+(?:e\s+hora\s+)?(?:d[aeo]\s+)?(?:emiss[ãa]o|compet[êe]ncia|presta[çc][ãa]o|servi[çc]o)(?:\s+d[aoe]s?\s+(?:nfs-?e|nota|servi[çc]os?))?|emitid[ao]\s+em|compet[êe]ncia)\s*:?\s*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{2}/\d{2}/\d{4})\b"
    ).unwrap();

    // Payer name patterns: the label is case-insensitive, the name is an
    // upper-case run
    pub static ref TOMADOR_SECTION_NAME: Regex = Regex::new(
        r"(?i:tomador(?:\s+d[eo]s?\s+servi[çc]os?)?)[^\n]{0,120}?(?i:nome(?:\s*/\s*raz[ãa]o\s+social)?|raz[ãa]o\s+social)\s*:?\s*([A-ZÀ-ÖØ-Þ]{2,}\b(?:[ \t]+[A-ZÀ-ÖØ-Þ]+\b)*)"
    ).unwrap();

    pub static ref TOMADOR_NAME: Regex = Regex::new(
        r"(?i:tomador(?:\s+d[eo]s?\s+servi[çc]os?)?)\s*:?\s*([A-ZÀ-ÖØ-Þ]{2,}\b(?:[ \t]+[A-ZÀ-ÖØ-Þ]+\b)*)"
    ).unwrap();

    pub static ref CLIENTE_NAME: Regex = Regex::new(
        r"(?i:cliente|pagador|respons[áa]vel)\s*:?\s*([A-ZÀ-ÖØ-Þ]{2,}\b(?:[ \t]+[A-ZÀ-ÖØ-Þ]+\b)*)"
    ).unwrap();

    // Same section, any letter case; the run is cut at the next field label
    pub static ref TOMADOR_SECTION_ANY_CASE: Regex = Regex::new(
        r"(?i:tomador(?:\s+d[eo]s?\s+servi[çc]os?)?)[^\n]{0,160}?(?i:nome(?:\s*/\s*raz[ãa]o\s+social)?|raz[ãa]o\s+social)\s*:?\s*(\p{Lu}[\p{L}'.]*(?:[ \t]+\p{L}[\p{L}'.]*){0,7})"
    ).unwrap();

    pub static ref PRESTADOR_NAME: Regex = Regex::new(
        r"(?i:prestador(?:\s+d[eo]s?\s+servi[çc]os?)?)\s*:?\s*([A-ZÀ-ÖØ-Þ]{2,}\b(?:[ \t]+[A-ZÀ-ÖØ-Þ]+\b)*)"
    ).unwrap();

    pub static ref UPPERCASE_RUN: Regex = Regex::new(
        r"\b([A-ZÀ-ÖØ-Þ][A-ZÀ-ÖØ-Þ ]{3,48}[A-ZÀ-ÖØ-Þ])\b"
    ).unwrap();

    // Field labels that a name run may swallow
    pub static ref NAME_TRAILING_LABEL: Regex = Regex::new(
        r"(?i)\b(?:CPF|CNPJ|RG|CEP|UF|ENDERE[ÇC]O|LOGRADOURO|BAIRRO|E-?MAIL|INSCRI[ÇC][ÃA]O|MUNIC[ÍI]PIO|TELEFONE|FONE|NOME|RAZ[ÃA]O|VALOR|DATA|DISCRIMINA[ÇC][ÃA]O|DESCRI[ÇC][ÃA]O|TOMADOR|PRESTADOR)\b"
    ).unwrap();

    // Description patterns
    pub static ref SERVICE_DESCRIPTION: Regex = Regex::new(
        r"(?is)(?:discrimina[çc][ãa]o\s+d[oe]s?\s+servi[çc]os?|descri[çc][ãa]o(?:\s+d[oe]s?\s+servi[çc]os?)?)\s*:?\s*(.+?)(?:\n[ \t]*\n|R\$|\bvalor\b|$)"
    ).unwrap();

    pub static ref REFERENTE_A: Regex = Regex::new(
        r"(?i)(referente\s+a[^\n;]*?)(?:\.(?:\s|$)|\n|;|R\$|$)"
    ).unwrap();
}
