pub(crate) mod csv_bank;
pub(crate) mod pdf_statement;
pub(crate) mod xls_html;
