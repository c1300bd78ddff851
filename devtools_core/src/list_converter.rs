//! Newline-delimited list reshaping (case-fold, dedupe, sort, wrap, join).
use std::collections::HashSet;

use serde::Deserialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    None,
    Asc,
    Desc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListConverterOptions {
    pub lower_case: bool,
    pub trim_items: bool,
    pub remove_duplicates: bool,
    pub reverse_list: bool,
    pub sort_list: SortOrder,
    pub item_prefix: String,
    pub item_suffix: String,
    pub list_prefix: String,
    pub list_suffix: String,
    pub separator: String,
    pub keep_line_breaks: bool,
}

impl Default for ListConverterOptions {
    fn default() -> Self {
        Self {
            lower_case: false,
            trim_items: true,
            remove_duplicates: true,
            reverse_list: false,
            sort_list: SortOrder::None,
            item_prefix: String::new(),
            item_suffix: String::new(),
            list_prefix: String::new(),
            list_suffix: String::new(),
            separator: ", ".into(),
            keep_line_breaks: false,
        }
    }
}

pub fn convert_list(input: &str, options: &ListConverterOptions) -> String {
    if input.trim().is_empty() {
        return String::new();
    }
    log::debug!("converting {} byte list", input.len());
    let text = if options.lower_case {
        input.to_lowercase()
    } else {
        input.to_string()
    };

    let mut items: Vec<&str> = text
        .lines()
        .map(|line| if options.trim_items { line.trim() } else { line })
        .filter(|line| !line.is_empty())
        .collect();

    if options.remove_duplicates {
        let mut seen = HashSet::new();
        items.retain(|item| seen.insert(*item));
    }
    if options.reverse_list {
        items.reverse();
    }
    match options.sort_list {
        SortOrder::None => {}
        SortOrder::Asc => items.sort_unstable(),
        SortOrder::Desc => items.sort_unstable_by(|a, b| b.cmp(a)),
    }

    let line_break = if options.keep_line_breaks { "\n" } else { "" };
    let joiner = format!("{}{line_break}", options.separator);
    let body = items
        .iter()
        .map(|item| format!("{}{item}{}", options.item_prefix, options.item_suffix))
        .collect::<Vec<_>>()
        .join(&joiner);

    [options.list_prefix.as_str(), body.as_str(), options.list_suffix.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(line_break)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn newline_options() -> ListConverterOptions {
        ListConverterOptions {
            separator: "\n".into(),
            sort_list: SortOrder::Asc,
            lower_case: true,
            ..ListConverterOptions::default()
        }
    }

    #[test]
    fn dedupe_and_sort_is_idempotent() {
        let options = newline_options();
        let inputs = [
            "banana\n Apple\napple \n\ncherry\nBanana",
            "  z\ny\nx\ny\nz  ",
            "single",
        ];
        for input in inputs {
            let once = convert_list(input, &options);
            assert_eq!(convert_list(&once, &options), once, "input: {input:?}");
        }
        assert_eq!(convert_list(inputs[0], &options), "apple\nbanana\ncherry");
    }

    #[test]
    fn wraps_items_and_list() {
        let options = ListConverterOptions {
            item_prefix: "'".into(),
            item_suffix: "'".into(),
            list_prefix: "(".into(),
            list_suffix: ")".into(),
            separator: ",".into(),
            ..ListConverterOptions::default()
        };
        assert_eq!(convert_list("a\nb\na\n", &options), "('a','b')");
    }

    #[test]
    fn keep_line_breaks_spreads_output() {
        let options = ListConverterOptions {
            list_prefix: "[".into(),
            list_suffix: "]".into(),
            separator: ",".into(),
            keep_line_breaks: true,
            sort_list: SortOrder::Desc,
            ..ListConverterOptions::default()
        };
        assert_eq!(convert_list("1\n3\n2", &options), "[\n3,\n2,\n1\n]");
    }

    #[test]
    fn reverse_without_dedupe_keeps_everything() {
        let options = ListConverterOptions {
            remove_duplicates: false,
            reverse_list: true,
            ..ListConverterOptions::default()
        };
        assert_eq!(convert_list("a\nb\na", &options), "a, b, a");
    }

    #[test]
    fn blank_input_is_a_no_op() {
        assert_eq!(convert_list(" \n \n", &ListConverterOptions::default()), "");
    }
}
