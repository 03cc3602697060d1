//! Extracts slides and quiz questions from authored module content.
//!
//! The authoring tool emits an HTML-like convention: repeated
//! `<div class="module-slide" data-slide="N">` blocks, each carrying a title
//! fragment and either slide markup or a question description. Parsing is a
//! pure transform: malformed input degrades to a single placeholder entry,
//! it never fails.

use crate::models::content::{Choice, Question, QuestionType, Slide};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SLIDE_OPEN: Regex =
        Regex::new(r#"<div class="module-slide" data-slide="(\d+)">"#).unwrap();
    static ref SLIDE_TITLE: Regex =
        Regex::new(r#"<h2 class="slide-title">(.*?)</h2>"#).unwrap();
    static ref SLIDE_CONTENT: Regex =
        Regex::new(r#"(?s)<div class="slide-content">(.*?)</div>"#).unwrap();
    static ref QUESTION_TITLE: Regex = Regex::new(r"Question \d+:\s*([^<]+)").unwrap();
    static ref QUESTION_POINTS: Regex = Regex::new(r"(?i)(\d+)\s*points?").unwrap();
    static ref CHOICE_PRIMARY: Regex = Regex::new(
        r#"(?s)data-choice-id="([^"]*)"[^>]*data-correct="([^"]*)"[^>]*>.*?([A-Z])\.\s*([^<]+)"#
    )
    .unwrap();
    static ref CHOICE_FALLBACK: Regex =
        Regex::new(r"<span[^>]*>([A-D])\.\s*([^<]+)</span>").unwrap();
}

/// Split module content into ordered slides. Blocks are sliced between
/// marker positions so nested markup inside a slide cannot truncate its
/// body. With no recognized markers the whole input becomes a single slide
/// numbered 1.
pub fn parse_slides(content: &str) -> Vec<Slide> {
    let opens: Vec<(usize, usize, u32)> = SLIDE_OPEN
        .captures_iter(content)
        .filter_map(|caps| {
            let marker = caps.get(0)?;
            Some((marker.start(), marker.end(), caps[1].parse().unwrap_or(1)))
        })
        .collect();

    let slides: Vec<Slide> = opens
        .iter()
        .enumerate()
        .map(|(index, &(_, body_start, number))| {
            let body_end = opens
                .get(index + 1)
                .map(|&(next_start, _, _)| next_start)
                .unwrap_or(content.len());
            let body = trim_block_end(&content[body_start..body_end]);

            let title = SLIDE_TITLE
                .captures(body)
                .map(|t| t[1].to_string())
                .unwrap_or_else(|| format!("Slide {}", number));

            let slide_content = SLIDE_CONTENT
                .captures(body)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| body.to_string());

            Slide {
                number,
                title,
                content: slide_content,
            }
        })
        .collect();

    if slides.is_empty() {
        vec![Slide {
            number: 1,
            title: "Content".to_string(),
            content: content.to_string(),
        }]
    } else {
        slides
    }
}

/// Split quiz content into ordered questions. Each marker opens a block that
/// runs until the next marker or end of input; numbering is positional.
pub fn parse_questions(content: &str) -> Vec<Question> {
    let opens: Vec<(usize, usize)> = SLIDE_OPEN
        .find_iter(content)
        .map(|m| (m.start(), m.end()))
        .collect();

    let questions: Vec<Question> = opens
        .iter()
        .enumerate()
        .map(|(index, &(_, body_start))| {
            let body_end = opens
                .get(index + 1)
                .map(|&(next_start, _)| next_start)
                .unwrap_or(content.len());
            parse_question_block(&content[body_start..body_end], index as u32 + 1)
        })
        .collect();

    if questions.is_empty() {
        vec![placeholder_question()]
    } else {
        questions
    }
}

fn parse_question_block(body: &str, number: u32) -> Question {
    let title = QUESTION_TITLE
        .captures(body)
        .map(|t| t[1].trim().to_string())
        .unwrap_or_else(|| format!("Question {}", number));

    let question_type = classify(body);

    let points = QUESTION_POINTS
        .captures(body)
        .and_then(|p| p[1].parse().ok())
        .unwrap_or(1);

    let mut heuristic_correctness = false;
    let choices = if question_type.has_choices() {
        let mut parsed: Vec<Choice> = CHOICE_PRIMARY
            .captures_iter(body)
            .map(|caps| Choice {
                id: caps[1].to_string(),
                text: caps[4].trim().to_string(),
                is_correct: &caps[2] == "true",
            })
            .collect();

        if parsed.is_empty() {
            // Looser authoring style with no correctness markup. Assume the
            // first option is the correct one and flag the guess.
            parsed = CHOICE_FALLBACK
                .captures_iter(body)
                .enumerate()
                .map(|(i, caps)| Choice {
                    id: caps[1].to_string(),
                    text: caps[2].trim().to_string(),
                    is_correct: i == 0,
                })
                .collect();
            if !parsed.is_empty() {
                heuristic_correctness = true;
                tracing::warn!(
                    question = number,
                    "no correctness markup found, assuming first choice is correct"
                );
            }
        }
        parsed
    } else {
        Vec::new()
    };

    Question {
        number,
        title,
        question_type,
        points,
        choices,
        heuristic_correctness,
    }
}

/// Drop the block's own closing tag and the optional separator from a
/// position-sliced body, so only the slide's inner markup remains.
fn trim_block_end(body: &str) -> &str {
    let body = body.trim_end();
    let body = body
        .strip_suffix(r#"<hr class="slide-separator" />"#)
        .map(str::trim_end)
        .unwrap_or(body);
    body.strip_suffix("</div>").unwrap_or(body).trim_end()
}

fn classify(body: &str) -> QuestionType {
    if body.contains("TRUE") && body.contains("FALSE") {
        QuestionType::TrueFalse
    } else if body.contains("SHORT ANSWER") {
        QuestionType::ShortAnswer
    } else if body.contains("ESSAY") {
        QuestionType::Essay
    } else if body.contains("ENUMERATION") {
        QuestionType::Enumeration
    } else {
        QuestionType::MultipleChoice
    }
}

fn placeholder_question() -> Question {
    Question {
        number: 1,
        title: "Question".to_string(),
        question_type: QuestionType::MultipleChoice,
        points: 1,
        choices: Vec::new(),
        heuristic_correctness: false,
    }
}
