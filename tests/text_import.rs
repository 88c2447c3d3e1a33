mod common;

use common::{correct, texts};
use docx_quiz::{Error, ParseOptions, QuestionType, SanitizedQuestion, parse_text, to_quiz_text};

fn parse(text: &str) -> Vec<SanitizedQuestion> {
    parse_text(text, &ParseOptions::default()).expect("parse text")
}

#[test]
fn true_false_options_are_reordered() {
    let swapped = parse("Câu 1: Trái đất quay quanh mặt trời\nA. Sai\nB. Đúng*");
    let ordered = parse("Câu 1: Trái đất quay quanh mặt trời\nA. Đúng*\nB. Sai");
    for questions in [&swapped, &ordered] {
        let q = &questions[0];
        assert_eq!(texts(q), ["Đúng", "Sai"]);
        assert_eq!(correct(q), [0]);
        assert_eq!(q.question_type, QuestionType::SingleChoice);
    }
}

#[test]
fn bare_true_false_lines() {
    let q = &parse("Câu 1: Mặt trăng tự phát sáng\nĐúng\n*Sai")[0];
    assert_eq!(texts(q), ["Đúng", "Sai"]);
    assert_eq!(correct(q), [1]);
}

#[test]
fn pipe_matching_pairs() {
    let q = &parse("Câu 1: Ghép cặp: Mèo|Động vật Cá|Động vật nước")[0];
    assert_eq!(q.question_type, QuestionType::Matching);
    assert_eq!(q.title, "Ghép cặp:");
    assert_eq!(texts(q), ["Mèo", "Động vật", "Cá", "Động vật nước"]);
    assert!(q.options.iter().all(|o| o.is_correct));
    assert!(!q.multi);
}

#[test]
fn arrows_in_choices_are_not_matching_pairs() {
    let q = &parse(
        "Câu 1: Phương trình nào cân bằng?\nA. 2H2 + O2 -> 2H2O*\nB. H2 + O2 -> H2O",
    )[0];
    assert_eq!(q.question_type, QuestionType::SingleChoice);
    assert_eq!(texts(q), ["2H2 + O2 -> 2H2O", "H2 + O2 -> H2O"]);
    assert_eq!(correct(q), [0]);
}

#[test]
fn single_option_questions_are_dropped() {
    let questions = parse(
        "Câu 1: Thủ đô của Nhật Bản là gì? Tokyo\n\
         Câu 2: Chọn đáp án\n\
         A. Duy nhất\n\
         Câu 3: Trình bày khái niệm quang hợp",
    );
    assert_eq!(questions.len(), 2);

    assert_eq!(questions[0].id, "q-1");
    assert_eq!(questions[0].question_type, QuestionType::FillInBlank);
    assert_eq!(questions[0].title, "Thủ đô của Nhật Bản là gì?");
    assert_eq!(texts(&questions[0]), ["Tokyo"]);
    assert_eq!(correct(&questions[0]), [0]);

    assert_eq!(questions[1].id, "q-2");
    assert_eq!(questions[1].title, "Trình bày khái niệm quang hợp");
    assert!(questions[1].options.is_empty());
    assert_eq!(questions[1].question_type, QuestionType::SingleChoice);
}

#[test]
fn label_line_marks_multiple_choice() {
    let q = &parse("Câu 1: Số nguyên tố nhỏ hơn 5?\n(Chọn 2 đáp án)\nA. 2*\nB. 4\nC. 3")[0];
    assert_eq!(q.title, "Số nguyên tố nhỏ hơn 5?");
    assert_eq!(q.question_type, QuestionType::MultipleChoice);
    assert!(q.multi);
    assert_eq!(texts(q), ["2", "4", "3"]);
}

#[test]
fn exported_text_parses_back_to_the_same_questions() {
    let source = "Câu 1: Thủ đô của Việt Nam?\n\
                  A. Huế\n\
                  B. Hà Nội*\n\
                  C. Đà Nẵng\n\
                  \n\
                  Câu 2: Số chẵn?\n\
                  A. 2*\n\
                  B. 3\n\
                  C. 4*";
    let first = parse(source);
    assert_eq!(first[1].question_type, QuestionType::MultipleChoice);

    let exported = to_quiz_text(&first);
    assert!(exported.contains("B. Hà Nội(*)"));
    let second = parse(&exported);
    assert_eq!(first, second);
}

#[test]
fn json_shape() {
    let questions = parse("Câu 1: Thủ đô của Pháp?\nA. Lyon\nB. Paris*");
    let value = serde_json::to_value(&questions[0]).unwrap();
    assert_eq!(value["id"], "q-1");
    assert_eq!(value["type"], "SINGLE_CHOICE");
    assert_eq!(value["multi"], false);
    assert_eq!(value["options"][1]["id"], "q-1-option-1");
    assert_eq!(value["options"][1]["isCorrect"], true);
    assert_eq!(value["options"][1]["order"], 1);
    assert!(value.get("content").is_none());
    assert!(value.get("imageUrl").is_none());
}

#[test]
fn empty_text_has_no_content() {
    let err = parse_text("  \n\u{a0}\n", &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, Error::NoContent));
}
