use gradekit::{Locale, feedback::split_feedback};

/// Strips the header line of every part and collects the body lines.
fn bodies(parts: &[String]) -> Vec<&str> {
    parts
        .iter()
        .flat_map(|part| part.lines().skip(1))
        .collect()
}

#[test]
fn short_feedback_stays_in_one_part() {
    let parts = split_feedback(&["a", "b"], "Header", 100, Locale::En);
    assert_eq!(parts, vec!["Header\na\nb".to_string()]);
}

#[test]
fn no_lines_gives_only_the_header() {
    let none: [&str; 0] = [];
    assert_eq!(split_feedback(&none, "Header", 100, Locale::En), vec!["Header".to_string()]);
}

#[test]
fn long_feedback_is_split_and_numbered() {
    let lines = (0..5).map(|i| format!("line-{i:04}")).collect::<Vec<_>>();
    assert!(lines.iter().all(|line| line.len() == 9));

    // Two lines and a separator take 19 characters, three take 29.
    let parts = split_feedback(&lines, "H", 25, Locale::En);
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "H (feedback 1/3)\nline-0000\nline-0001");
    assert_eq!(parts[1], "H (feedback 2/3)\nline-0002\nline-0003");
    assert_eq!(parts[2], "H (feedback 3/3)\nline-0004");

    assert_eq!(bodies(&parts), lines.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn bodies_respect_the_budget() {
    let lines = (0..200)
        .map(|i| "x".repeat(1 + i % 37))
        .collect::<Vec<_>>();
    let parts = split_feedback(&lines, "Group", 120, Locale::En);
    assert!(parts.len() > 1);
    for part in &parts {
        let (_, body) = part.split_once('\n').expect("every part has a body");
        assert!(body.chars().count() <= 120, "body too long: {}", body.len());
    }
    assert_eq!(bodies(&parts), lines.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn oversized_line_gets_its_own_part() {
    let long = "y".repeat(50);
    let lines = vec!["short".to_string(), long.clone(), "tail".to_string()];
    let parts = split_feedback(&lines, "H", 20, Locale::En);
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[1], format!("H (feedback 2/3)\n{long}"));
}

#[test]
fn part_suffix_is_localized() {
    let parts = split_feedback(&["aaaa", "bbbb"], "Kopf", 4, Locale::De);
    assert_eq!(parts, vec!["Kopf (Feedback 1/2)\naaaa", "Kopf (Feedback 2/2)\nbbbb"]);
}
