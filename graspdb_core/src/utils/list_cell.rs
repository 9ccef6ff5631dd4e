//! Tokenizing free-text list cells (uniprot ids, pdb ids, reference lists)

/// Split a list cell on the first separator found, checked in priority order
/// `", "`, `"; "`, `" "`, `","` (only when `allow_bare_comma` is set), `";"`.
///
/// Pieces are trimmed and empty pieces dropped, so a blank cell yields an
/// empty vector and a cell without separators yields a single item.
///
/// # Examples
/// ```rust
/// use graspdb_core::utils::list_cell::split_list_cell;
/// assert_eq!(split_list_cell("P00001, P00002", false), vec!["P00001", "P00002"]);
/// assert_eq!(split_list_cell("1abc,2xyz", true), vec!["1abc", "2xyz"]);
/// ```
pub fn split_list_cell(text: &str, allow_bare_comma: bool) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let separator = if text.contains(", ") {
        Some(", ")
    } else if text.contains("; ") {
        Some("; ")
    } else if text.contains(' ') {
        Some(" ")
    } else if allow_bare_comma && text.contains(',') {
        Some(",")
    } else if text.contains(';') {
        Some(";")
    } else {
        None
    };
    match separator {
        Some(sep) => text
            .split(sep)
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
        None => vec![text.to_string()],
    }
}

/// Split a cell on a single fixed separator, trimming pieces and dropping empties
pub fn split_on(text: &str, separator: char) -> Vec<String> {
    text.split(separator)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a metabolite token such as `pep_c` into its bigg id and compartment.
///
/// The compartment is the text after the last underscore. Tokens without an
/// underscore have no compartment.
pub fn split_compartment(token: &str) -> (&str, Option<&str>) {
    match token.rsplit_once('_') {
        Some((bigg_id, compartment)) if !bigg_id.is_empty() && !compartment.is_empty() => {
            (bigg_id, Some(compartment))
        }
        _ => (token, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_priority() {
        assert_eq!(split_list_cell("a, b", false), vec!["a", "b"]);
        assert_eq!(split_list_cell("a; b", false), vec!["a", "b"]);
        assert_eq!(split_list_cell("a b", false), vec!["a", "b"]);
        assert_eq!(split_list_cell("a,b", true), vec!["a", "b"]);
        assert_eq!(split_list_cell("a", false), vec!["a"]);
    }

    #[test]
    fn comma_with_space_wins_over_bare_comma() {
        // ", " is found first, so the bare comma inside the second item survives
        assert_eq!(split_list_cell("a, b,c", true), vec!["a", "b,c"]);
    }

    #[test]
    fn bare_comma_needs_flag() {
        assert_eq!(split_list_cell("a,b", false), vec!["a,b"]);
        assert_eq!(split_list_cell("a;b", false), vec!["a", "b"]);
    }

    #[test]
    fn blank_cell() {
        assert!(split_list_cell("   ", true).is_empty());
    }

    #[test]
    fn compartments() {
        assert_eq!(split_compartment("pep_c"), ("pep", Some("c")));
        assert_eq!(split_compartment("glc__D_e"), ("glc__D", Some("e")));
        assert_eq!(split_compartment("h2o"), ("h2o", None));
        assert_eq!(split_compartment("h2o_"), ("h2o_", None));
    }

    #[test]
    fn fixed_separator() {
        assert_eq!(split_on("Article; Online database", ';'), vec!["Article", "Online database"]);
        assert!(split_on("", ';').is_empty());
    }
}
