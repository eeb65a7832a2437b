use super::{escape_html, layout};
use crate::session::Flash;
use std::fmt::Write;
use stockpick_core::domain::preferences::{
    DividendPriority, EthicalConsideration, InvestmentForm, InvestmentType, RiskLevel, Sector,
};

fn select(out: &mut String, name: &str, label: &str, choices: &[(&str, &str)], current: Option<&str>) {
    let _ = write!(out, r#"<div class="field"><label for="{name}">{label}</label><select id="{name}" name="{name}">"#);
    for (value, text) in choices {
        let selected = if current == Some(*value) { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{value}"{selected}>{text}</option>"#);
    }
    out.push_str("</select></div>\n");
}

fn number(out: &mut String, name: &str, label: &str, current: Option<&str>, attrs: &str) {
    let value = escape_html(current.unwrap_or(""));
    let _ = write!(
        out,
        r#"<div class="field"><label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" value="{value}" {attrs} required></div>
"#
    );
}

fn checkboxes(out: &mut String, name: &str, label: &str, choices: &[(&str, &str)], checked: &[String]) {
    let _ = write!(out, r#"<div class="field"><label>{label}</label>"#);
    for (value, text) in choices {
        let on = if checked.iter().any(|c| c == value) { " checked" } else { "" };
        let _ = write!(
            out,
            r#"<span class="choice"><input type="checkbox" id="{name}-{value}" name="{name}" value="{value}"{on}> <label for="{name}-{value}" style="display:inline">{text}</label></span> "#
        );
    }
    out.push_str("</div>\n");
}

/// Investment profile form, pre-filled with `form`.
pub fn index_page(form: &InvestmentForm, flashes: &[Flash]) -> String {
    let risk: Vec<(&str, &str)> = RiskLevel::CHOICES.iter().map(|(v, t)| (v.as_str(), *t)).collect();
    let sectors: Vec<(&str, &str)> = Sector::ALL.iter().map(|s| (s.slug(), s.label())).collect();
    let dividend: Vec<(&str, &str)> = DividendPriority::CHOICES.iter().map(|(v, t)| (v.code(), *t)).collect();
    let ethical: Vec<(&str, &str)> = EthicalConsideration::CHOICES.iter().map(|(v, t)| (v.as_str(), *t)).collect();
    let types: Vec<(&str, &str)> = InvestmentType::CHOICES.iter().map(|(v, t)| (v.as_str(), *t)).collect();

    let mut body = String::from(
        r#"<div class="panel"><h1>Investment Profile</h1>
<p>Tell us about your goals and we will suggest investments that match them.</p>
<form method="post" action="/">
"#,
    );
    select(&mut body, "risk_level", "Risk Level", &risk, form.risk_level.as_deref());
    number(&mut body, "desired_return", "Desired Annual Return (%)", form.desired_return.as_deref(), r#"min="0" max="100" step="any""#);
    number(&mut body, "duration", "Investment Duration (Years)", form.duration.as_deref(), r#"min="1" max="30" step="1""#);
    checkboxes(&mut body, "sectors", "Preferred Sectors", &sectors, &form.sectors);
    number(&mut body, "budget", "Investment Budget ($)", form.budget.as_deref(), r#"min="1000" step="any""#);
    select(&mut body, "dividend_priority", "Dividend Priority", &dividend, form.dividend_priority.as_deref());
    checkboxes(&mut body, "ethical_considerations", "Ethical Considerations", &ethical, &form.ethical_considerations);
    checkboxes(&mut body, "investment_types", "Investment Types", &types, &form.investment_types);
    body.push_str(r#"<button type="submit" class="btn">Get Recommendations</button>
</form></div>"#);

    layout("Investment Profile", flashes, &body, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_form_has_every_field() {
        let html = index_page(&InvestmentForm::default(), &[]);
        for name in [
            "risk_level",
            "desired_return",
            "duration",
            "sectors",
            "budget",
            "dividend_priority",
            "ethical_considerations",
            "investment_types",
        ] {
            assert!(html.contains(&format!(r#"name="{name}""#)), "missing {name}");
        }
        assert!(html.contains(r#"value="real_estate""#));
    }

    #[test]
    fn submitted_values_are_kept() {
        let form = InvestmentForm {
            risk_level: Some("high".to_string()),
            budget: Some("\"500\"".to_string()),
            sectors: vec!["energy".to_string()],
            ..InvestmentForm::default()
        };
        let html = index_page(&form, &[]);
        assert!(html.contains(r#"<option value="high" selected>"#));
        assert!(html.contains(r#"value="energy" checked"#));
        assert!(html.contains(r#"value="&quot;500&quot;""#));
    }
}
