//! Work description extraction, used for nominal code disambiguation.

use lazy_static::lazy_static;
use regex::Captures;

use super::patterns::*;
use super::{group, Rule, RuleCascade, RuleContext, RuleScope};
use crate::models::invoice::FieldKind;

const MAX_DESCRIPTION_CHARS: usize = 500;

/// Strip template markers, collapse whitespace and cap the length.
fn clean(raw: &str) -> Option<String> {
    let stripped = TEMPLATE_MARKER.replace_all(raw, "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= 5 {
        return None;
    }
    Some(collapsed.chars().take(MAX_DESCRIPTION_CHARS).collect())
}

fn description(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<String> {
    clean(group(caps, 1)?)
}

lazy_static! {
    static ref DESCRIPTION_RULES: RuleCascade<String> = RuleCascade::new(
        FieldKind::Description,
        vec![
            Rule::pattern("description.aaw.works", RuleScope::Supplier("AAW"), 100, &AAW_WORKS_DESCRIPTION, description),
            Rule::pattern("description.cjl.item", RuleScope::Supplier("CJL"), 100, &CJL_ITEM_DESCRIPTION, description),
            Rule::pattern("description.cjl.subject", RuleScope::Supplier("CJL"), 110, &SUBJECT_BLOCK, description),
            Rule::pattern("description.amazon.order_information", RuleScope::Supplier("AMAZON"), 100, &AMAZON_ORDER_INFORMATION, description),
            Rule::pattern("description.label", RuleScope::Any, 200, &DESCRIPTION_LABEL, description),
            Rule::pattern("description.work", RuleScope::Any, 210, &WORK_DESCRIPTION, description),
            Rule::pattern("description.details", RuleScope::Any, 220, &DETAILS_LABEL, description),
        ],
    );
}

pub fn description_rules() -> &'static RuleCascade<String> {
    &DESCRIPTION_RULES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::FieldExtractor;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_description_table() {
        let cases: &[(&str, Option<&str>, &str, &str)] = &[
            (
                "Works Description:\nReplace faulty\n  shutter motor\nWorks Completed: yes",
                Some("AAW"),
                "Replace faulty shutter motor",
                "description.aaw.works",
            ),
            (
                "Subject :\nEmergency lighting test\nPortsmouth\n# Item",
                Some("CJL"),
                "Emergency lighting test Portsmouth",
                "description.cjl.subject",
            ),
            ("Description: Fire alarm service ##VAR12 x##\n\nTotal", None, "Fire alarm service", "description.label"),
            ("Work Description\nRepair door closer\n\nNET", None, "Repair door closer", "description.work"),
        ];
        for (text, supplier, expected, rule_id) in cases {
            let ctx = RuleContext::new(*supplier, "x.pdf");
            let m = description_rules()
                .extract(text, &ctx)
                .unwrap_or_else(|| panic!("no description for {:?}", text));
            assert_eq!(m.value, *expected, "text {:?}", text);
            assert_eq!(m.rule_id, *rule_id, "text {:?}", text);
        }
    }

    #[test]
    fn test_short_descriptions_rejected() {
        let ctx = RuleContext::new(None, "x.pdf");
        assert!(description_rules().extract("Description: n/a\n\n", &ctx).is_none());
    }

    #[test]
    fn test_description_truncated() {
        let long = format!("Description: {}\n\n", "x".repeat(800));
        let ctx = RuleContext::new(None, "x.pdf");
        let m = description_rules().extract(&long, &ctx).unwrap();
        assert_eq!(m.value.chars().count(), 500);
    }
}
