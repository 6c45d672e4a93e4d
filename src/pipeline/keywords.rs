//! Keyword extraction for listing projections.
//!
//! Summaries use a two-tier word-boundary scan with an ordered fallback
//! table. Details use a larger vocabulary with plain substring matching.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Maximum keywords on a summary.
pub const SUMMARY_LIMIT: usize = 3;

/// Maximum keywords on a detail.
pub const DETAIL_LIMIT: usize = 5;

/// Role and stack terms looked up in the category field.
pub const FIELD_VOCABULARY: &[&str] = &[
    "Java",
    "Python",
    "React",
    "AI",
    "ML",
    "데이터",
    "서버",
    "프론트엔드",
    "백엔드",
    "DevOps",
    "클라우드",
    "Docker",
    "Kubernetes",
    "AWS",
];

/// Frameworks and stores looked up in the body text.
pub const BODY_VOCABULARY: &[&str] = &[
    "Spring",
    "Node.js",
    "TypeScript",
    "PostgreSQL",
    "MySQL",
    "Redis",
    "Elasticsearch",
    "TensorFlow",
    "PyTorch",
];

/// Detail vocabulary, matched in declaration order.
pub const DETAIL_VOCABULARY: &[&str] = &[
    "Python",
    "Java",
    "JavaScript",
    "TypeScript",
    "React",
    "Vue",
    "Angular",
    "Node.js",
    "Spring",
    "Django",
    "Flask",
    "Express",
    "MySQL",
    "PostgreSQL",
    "MongoDB",
    "Redis",
    "AWS",
    "Docker",
    "Kubernetes",
    "Jenkins",
    "TensorFlow",
    "PyTorch",
    "OpenCV",
    "Pandas",
    "NumPy",
    "Machine Learning",
    "Deep Learning",
    "AI",
    "ML",
    "REST API",
    "GraphQL",
    "Microservices",
    "Git",
    "GitHub",
    "GitLab",
];

/// Fixed keywords applied when nothing matched.
///
/// Rules are checked in order against the category field; the first rule
/// with any marker present wins. A rule with no markers always matches.
pub struct FallbackRule {
    pub markers: &'static [&'static str],
    pub keywords: [&'static str; SUMMARY_LIMIT],
}

impl FallbackRule {
    fn matches(&self, field: &str) -> bool {
        self.markers.is_empty() || self.markers.iter().any(|m| field.contains(m))
    }
}

pub const FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        markers: &["AI", "ML"],
        keywords: ["AI", "ML", "Python"],
    },
    FallbackRule {
        markers: &["프론트엔드", "React"],
        keywords: ["React", "JavaScript", "TypeScript"],
    },
    FallbackRule {
        markers: &["백엔드", "서버"],
        keywords: ["Java", "Spring", "Database"],
    },
    FallbackRule {
        markers: &[],
        keywords: ["개발", "연구", "기술"],
    },
];

/// A vocabulary compiled into a single case-insensitive alternation.
///
/// Boundaries are checked per match edge: an ASCII edge only joins ASCII
/// word characters, so `Java개발자` still yields `Java`, while a Hangul edge
/// joins any letter or digit.
struct Vocabulary {
    terms: &'static [&'static str],
    pattern: Regex,
}

impl Vocabulary {
    fn compile(terms: &'static [&'static str]) -> Self {
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&format!("(?:{alternation})"))
            .case_insensitive(true)
            .build()
            .expect("vocabulary terms are escaped");
        Self { terms, pattern }
    }

    /// Canonical spellings of the terms found in `text`, in order of appearance.
    fn scan<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'static str> + 'a {
        self.pattern
            .find_iter(text)
            .filter(|m| is_standalone(text, m.start(), m.end()))
            .filter_map(|m| {
                self.terms
                    .iter()
                    .copied()
                    .find(|t| t.eq_ignore_ascii_case(m.as_str()))
            })
    }
}

fn joins(edge: char, neighbor: char) -> bool {
    if edge.is_ascii() {
        neighbor.is_ascii_alphanumeric() || neighbor == '_'
    } else {
        neighbor.is_alphanumeric() || neighbor == '_'
    }
}

/// Whether `text[start..end]` is not glued to a neighboring word character.
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let term = &text[start..end];
    let (Some(first), Some(last)) = (term.chars().next(), term.chars().next_back()) else {
        return false;
    };
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    !before.is_some_and(|c| joins(first, c)) && !after.is_some_and(|c| joins(last, c))
}

static FIELD_TERMS: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::compile(FIELD_VOCABULARY));
static BODY_TERMS: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::compile(BODY_VOCABULARY));

fn push_unique(keywords: &mut Vec<String>, term: &str) {
    if !keywords.iter().any(|k| k.eq_ignore_ascii_case(term)) {
        keywords.push(term.to_string());
    }
}

/// Up to three keywords for a list summary.
pub fn summary_keywords(field: &str, body: &str) -> Vec<String> {
    let mut keywords = Vec::with_capacity(SUMMARY_LIMIT);

    for term in FIELD_TERMS.scan(field) {
        if keywords.len() >= SUMMARY_LIMIT {
            break;
        }
        push_unique(&mut keywords, term);
    }

    if keywords.len() < SUMMARY_LIMIT {
        for term in BODY_TERMS.scan(body) {
            if keywords.len() >= SUMMARY_LIMIT {
                break;
            }
            push_unique(&mut keywords, term);
        }
    }

    if keywords.is_empty() {
        if let Some(rule) = FALLBACK_RULES.iter().find(|r| r.matches(field)) {
            keywords.extend(rule.keywords.iter().map(|k| k.to_string()));
        }
    }

    keywords.truncate(SUMMARY_LIMIT);
    keywords
}

/// Up to five keywords for a detail view.
pub fn detail_keywords(body: &str, field: &str) -> Vec<String> {
    let body = body.to_lowercase();
    let field = field.to_lowercase();

    DETAIL_VOCABULARY
        .iter()
        .filter(|term| {
            let term = term.to_lowercase();
            body.contains(&term) || field.contains(&term)
        })
        .take(DETAIL_LIMIT)
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_terms_in_order_of_appearance() {
        let keywords = summary_keywords("백엔드 서버 개발 (Java, AWS)", "");
        assert_eq!(keywords, vec!["백엔드", "서버", "Java"]);
    }

    #[test]
    fn test_case_insensitive_canonical_spelling() {
        let keywords = summary_keywords("python / docker", "");
        assert_eq!(keywords, vec!["Python", "Docker"]);
    }

    #[test]
    fn test_body_terms_fill_up_to_three() {
        let keywords = summary_keywords("AI 연구", "PyTorch 및 TensorFlow 활용, Redis");
        assert_eq!(keywords, vec!["AI", "PyTorch", "TensorFlow"]);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let keywords = summary_keywords("Java java JAVA", "");
        assert_eq!(keywords, vec!["Java"]);
    }

    #[test]
    fn test_word_boundary() {
        // "Javascript" must not count as "Java"
        let keywords = summary_keywords("Javascript", "");
        assert_eq!(keywords, vec!["개발", "연구", "기술"]);
    }

    #[test]
    fn test_ascii_terms_next_to_hangul() {
        assert_eq!(summary_keywords("Java개발자", ""), vec!["Java"]);
        assert_eq!(summary_keywords("인공지능(AI연구)", ""), vec!["AI"]);
        assert_eq!(summary_keywords("Python기반 데이터분석", ""), vec!["Python"]);
    }

    #[test]
    fn test_hangul_terms_need_separators() {
        assert_eq!(summary_keywords("데이터/서버 개발", ""), vec!["데이터", "서버"]);
        assert_eq!(summary_keywords("빅데이터", ""), vec!["개발", "연구", "기술"]);
    }

    #[test]
    fn test_fallback_rules_first_match_wins() {
        // Glued ASCII terms fail the boundary check but still hit the marker
        assert_eq!(summary_keywords("AIML연구", ""), vec!["AI", "ML", "Python"]);
        assert_eq!(
            summary_keywords("웹프론트엔드개발", ""),
            vec!["React", "JavaScript", "TypeScript"]
        );
        assert_eq!(
            summary_keywords("백엔드개발", ""),
            vec!["Java", "Spring", "Database"]
        );
        assert_eq!(summary_keywords("반도체/전자", ""), vec!["개발", "연구", "기술"]);
        assert_eq!(summary_keywords("", ""), vec!["개발", "연구", "기술"]);
    }

    #[test]
    fn test_fallback_not_applied_when_body_matched() {
        assert_eq!(summary_keywords("반도체", "Spring 경험"), vec!["Spring"]);
    }

    #[test]
    fn test_detail_keywords_declaration_order() {
        let keywords = detail_keywords(
            "Git, Docker, PyTorch, Python, TensorFlow, OpenCV 사용",
            "인공지능",
        );
        assert_eq!(
            keywords,
            vec!["Python", "Docker", "TensorFlow", "PyTorch", "OpenCV"]
        );
    }

    #[test]
    fn test_detail_keywords_match_field() {
        let keywords = detail_keywords("", "machine learning");
        assert_eq!(keywords, vec!["Machine Learning"]);
    }
}
