/// Derives the upper-snake-case export identifier for a root field.
///
/// An underscore goes before every maximal run of uppercase ASCII letters that
/// does not start the name, then the whole name is uppercased. A run gets one
/// underscore, not one per letter, so `IOStats` becomes `IOSTATS` and
/// `getHTTPStatus` becomes `GET_HTTPSTATUS`.
///
/// ```
/// use graphql_opgen::derive_identifier;
///
/// assert_eq!(derive_identifier("userById"), "USER_BY_ID");
/// assert_eq!(derive_identifier("createUser"), "CREATE_USER");
/// assert_eq!(derive_identifier("id"), "ID");
/// ```
#[must_use]
pub fn derive_identifier(field_name: &str) -> String {
    let mut out = String::with_capacity(field_name.len() + 4);
    let mut in_run = false;

    for (i, ch) in field_name.chars().enumerate() {
        let upper = ch.is_ascii_uppercase();
        if upper && !in_run && i > 0 {
            out.push('_');
        }
        in_run = upper;
        out.push(ch.to_ascii_uppercase());
    }

    out
}
