use crate::ui::query_groups::GENERAL_SUBJECT;
use once_cell::sync::Lazy;
use regex::Regex;

pub const KNOWN_COMPANIES: [&str; 23] = [
    "amazon",
    "microsoft",
    "google",
    "apple",
    "facebook",
    "meta",
    "tesla",
    "nike",
    "adidas",
    "campus x",
    "red chief",
    "walmart",
    "coca-cola",
    "pepsi",
    "netflix",
    "disney",
    "samsung",
    "sony",
    "intel",
    "amd",
    "ibm",
    "oracle",
    "salesforce",
];

const STOP_WORDS: [&str; 14] = [
    "show", "revenue", "metrics", "metric", "for", "the", "company", "what", "how", "give",
    "compare", "and", "with", "please",
];

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9&'-]*").expect("word pattern should compile"));

/// Subjects named by a user query, best effort.
///
/// Known companies come first, ordered by where they appear in the query. Without
/// one, capitalised words are taken as names; failing that, the first longer
/// word that is not filler.
pub fn subjects_in(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut found: Vec<(usize, &str)> = KNOWN_COMPANIES
        .iter()
        .filter_map(|company| first_word_match(&lowered, company).map(|at| (at, *company)))
        .collect();
    if !found.is_empty() {
        found.sort_by_key(|(at, _)| *at);
        return found
            .into_iter()
            .map(|(_, company)| company.to_string())
            .collect();
    }

    let is_stop = |word: &str| STOP_WORDS.contains(&word.to_lowercase().as_str());
    let titlecase: Vec<String> = WORD
        .find_iter(query)
        .map(|found| found.as_str())
        .filter(|word| word.chars().count() > 2 && is_titlecase(word) && !is_stop(word))
        .map(str::to_string)
        .collect();
    if !titlecase.is_empty() {
        return titlecase;
    }

    WORD.find_iter(&lowered)
        .map(|found| found.as_str())
        .find(|word| word.chars().count() > 3 && !is_stop(word))
        .map(|word| vec![word.to_string()])
        .unwrap_or_default()
}

/// Display label for the group created by `query`.
pub fn infer_subject(query: &str) -> String {
    subjects_in(query)
        .first()
        .map(|subject| display_name(subject))
        .unwrap_or_else(|| GENERAL_SUBJECT.to_string())
}

/// Capitalises the first letter of every space-separated word.
pub fn display_name(raw: &str) -> String {
    raw.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_titlecase(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_uppercase() && chars.all(|ch| !ch.is_uppercase())
}

fn first_word_match(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(at, _)| at).find(|&at| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_companies_in_order_of_appearance() {
        assert_eq!(subjects_in("Compare Nike vs Adidas revenue"), vec!["nike", "adidas"]);
        assert_eq!(subjects_in("how is Tesla doing against Apple"), vec!["tesla", "apple"]);
        assert_eq!(infer_subject("show campus x metrics"), "Campus X");
    }

    #[test]
    fn company_names_must_stand_alone() {
        assert_eq!(infer_subject("summarize the metadata pipeline"), "Summarize");
        assert!(!subjects_in("amdocs billing").contains(&"amd".to_string()));
    }

    #[test]
    fn capitalised_words_are_treated_as_names() {
        assert_eq!(subjects_in("Show Acme revenue"), vec!["Acme"]);
        assert_eq!(infer_subject("What is Zentrix churn?"), "Zentrix");
    }

    #[test]
    fn falls_back_to_main_word_then_general() {
        assert_eq!(infer_subject("show revenue metrics for the warehouse"), "Warehouse");
        assert_eq!(infer_subject("show the revenue"), GENERAL_SUBJECT);
        assert_eq!(infer_subject(""), GENERAL_SUBJECT);
    }
}
