use super::classify::question_type;
use crate::model::{QuestionKind, QuestionType, RawQuestion, SanitizedOption, SanitizedQuestion};

/// Convert classified questions into the storage contract.
///
/// A question left with exactly one option is dropped unless it is a
/// fill-in-blank. Ids are assigned after dropping, so they stay dense.
pub fn sanitize(questions: Vec<RawQuestion>) -> Vec<SanitizedQuestion> {
    questions
        .into_iter()
        .filter(|q| {
            let keep = q.options.len() != 1 || q.kind == QuestionKind::FillInBlank;
            if !keep {
                log::debug!("Dropping single-option question {:?}", q.title);
            }
            keep
        })
        .enumerate()
        .map(|(i, q)| sanitize_one(i + 1, q))
        .collect()
}

fn sanitize_one(number: usize, q: RawQuestion) -> SanitizedQuestion {
    let id = format!("q-{number}");
    let question_type = question_type(&q);
    let options = q
        .options
        .into_iter()
        .enumerate()
        .map(|(order, o)| SanitizedOption {
            id: format!("{id}-option-{order}"),
            text: o.value,
            is_correct: o.is_correct,
            order,
            image_url: o.image_url,
        })
        .collect();
    SanitizedQuestion {
        id,
        title: q.title,
        content: Some(q.content).filter(|c| !c.is_empty()),
        image_url: q.image_url,
        multi: question_type == QuestionType::MultipleChoice,
        question_type,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawOption;

    fn raw(options: Vec<RawOption>, kind: QuestionKind) -> RawQuestion {
        RawQuestion {
            title: "t".into(),
            options,
            kind,
            ..RawQuestion::default()
        }
    }

    #[test]
    fn drops_single_option_unless_fill_in_blank() {
        let out = sanitize(vec![
            raw(vec![RawOption::new("A", "x", true)], QuestionKind::Regular),
            raw(vec![RawOption::new("ANSWER", "x", true)], QuestionKind::FillInBlank),
            raw(vec![], QuestionKind::Regular),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].question_type, QuestionType::FillInBlank);
        assert_eq!(out[0].id, "q-1");
        assert!(out[1].options.is_empty());
        assert_eq!(out[1].id, "q-2");
    }

    #[test]
    fn option_ids_follow_source_order() {
        let mut a = RawOption::new("A", "x", false);
        a.image_url = Some("data:image/png;base64,AA==".into());
        let out = sanitize(vec![raw(
            vec![a, RawOption::new("B", "y", true)],
            QuestionKind::Regular,
        )]);
        let options = &out[0].options;
        assert_eq!(options[0].id, "q-1-option-0");
        assert_eq!(options[1].order, 1);
        assert_eq!(options[0].image_url.as_deref(), Some("data:image/png;base64,AA=="));
        assert_eq!(out[0].content, None);
        assert!(!out[0].multi);
    }
}
