/// Characters that may appear in a string without quotes.
pub(crate) fn is_unquoted_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '+' | '/' | ':' | '.' | '-')
}

pub(super) fn is_octal_digit(c: char) -> bool {
    ('0'..='7').contains(&c)
}

pub(super) fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}
