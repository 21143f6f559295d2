use chrono::NaiveDate;
use regex::Regex;

/// Result of parsing quick-add input. Tokens anywhere in the input set the
/// structured fields; the remainder becomes the title.
///
/// `^2025-06-01` date, `*10` gradual target, `#school` folder, `@urgent` tag,
/// `~45` duration minutes, `%red` display color.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedInput {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub target: Option<i64>,
    pub folder: Option<String>,
    pub tag: Option<String>,
    pub duration_minutes: Option<i64>,
    pub color: Option<String>,
}

pub fn parse_input(input: &str) -> ParsedInput {
    let date_re = Regex::new(r"\^(\d{4}-\d{2}-\d{2})\s*").unwrap();
    let target_re = Regex::new(r"\*(\d+)\s*").unwrap();
    let folder_re = Regex::new(r"#([\w-]+)\s*").unwrap();
    let tag_re = Regex::new(r"@([\w-]+)\s*").unwrap();
    let duration_re = Regex::new(r"~(\d+)\s*").unwrap();
    let color_re = Regex::new(r"%([\w]+)\s*").unwrap();

    let mut parsed = ParsedInput::default();

    // First valid occurrence of each token wins; the rest are stripped.
    for caps in date_re.captures_iter(input) {
        if parsed.date.is_none() {
            parsed.date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok();
        }
    }
    for caps in target_re.captures_iter(input) {
        if parsed.target.is_none() {
            parsed.target = caps[1].parse::<i64>().ok();
        }
    }
    for caps in folder_re.captures_iter(input) {
        if parsed.folder.is_none() {
            parsed.folder = Some(caps[1].to_string());
        }
    }
    for caps in tag_re.captures_iter(input) {
        if parsed.tag.is_none() {
            parsed.tag = Some(caps[1].to_string());
        }
    }
    for caps in duration_re.captures_iter(input) {
        if parsed.duration_minutes.is_none() {
            parsed.duration_minutes = caps[1].parse::<i64>().ok();
        }
    }
    for caps in color_re.captures_iter(input) {
        if parsed.color.is_none() {
            parsed.color = Some(caps[1].to_string());
        }
    }

    let mut title = input.to_string();
    for re in [&date_re, &target_re, &folder_re, &tag_re, &duration_re, &color_re] {
        title = re.replace_all(&title, "").to_string();
    }

    parsed.title = Regex::new(r"\s+")
        .unwrap()
        .replace_all(&title, " ")
        .trim()
        .to_string();

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_plain_title() {
        let result = parse_input("Write the launch announcement");
        assert_eq!(result.title, "Write the launch announcement");
        assert_eq!(result.target, None);
        assert_eq!(result.date, None);
    }

    #[test]
    fn test_parse_gradual_target_in_middle() {
        let result = parse_input("Read *10 chapters");
        assert_eq!(result.title, "Read chapters");
        assert_eq!(result.target, Some(10));
    }

    #[test]
    fn test_parse_folder_and_tag() {
        let result = parse_input("Revise notes #school @urgent");
        assert_eq!(result.title, "Revise notes");
        assert_eq!(result.folder.as_deref(), Some("school"));
        assert_eq!(result.tag.as_deref(), Some("urgent"));
    }

    #[test]
    fn test_parse_date_and_duration() {
        let result = parse_input("Submit report ^2025-06-01 ~45");
        assert_eq!(result.title, "Submit report");
        assert_eq!(result.date, Some(date("2025-06-01")));
        assert_eq!(result.duration_minutes, Some(45));
    }

    #[test]
    fn test_parse_invalid_date_is_stripped() {
        let result = parse_input("Plan trip ^2025-13-40");
        assert_eq!(result.title, "Plan trip");
        assert_eq!(result.date, None);
    }

    #[test]
    fn test_parse_first_token_wins_and_spaces_collapse() {
        let result = parse_input("  *3  *7 Water   the plants %green ");
        assert_eq!(result.title, "Water the plants");
        assert_eq!(result.target, Some(3));
        assert_eq!(result.color.as_deref(), Some("green"));
    }
}
