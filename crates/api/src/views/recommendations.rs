use super::cards::{render_results, CARDS_SCRIPT, SHUFFLE_BUTTON_ID};
use super::{escape_html, layout};
use crate::session::Flash;
use stockpick_core::domain::preferences::{
    DividendPriority, EthicalConsideration, InvestmentPreferences, InvestmentType, RiskLevel,
};
use stockpick_core::domain::recommendation::Recommendation;

fn label<T: PartialEq + Copy>(choices: &[(T, &'static str)], value: T) -> &'static str {
    choices
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, l)| *l)
        .unwrap_or("")
}

fn joined<T: PartialEq + Copy>(choices: &[(T, &'static str)], values: &[T]) -> String {
    if values.is_empty() {
        return "None".to_string();
    }
    values
        .iter()
        .map(|v| label(choices, *v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn preferences_panel(prefs: &InvestmentPreferences) -> String {
    let sectors = prefs
        .sectors
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ");
    let rows = [
        ("Risk Level", label(&RiskLevel::CHOICES, prefs.risk_level).to_string()),
        ("Desired Return", format!("{}%", prefs.desired_return)),
        ("Duration", format!("{} years", prefs.duration)),
        ("Sectors", sectors),
        ("Budget", format!("${:.2}", prefs.budget)),
        (
            "Dividend Priority",
            label(&DividendPriority::CHOICES, prefs.dividend_priority).to_string(),
        ),
        (
            "Ethical Considerations",
            joined(&EthicalConsideration::CHOICES, &prefs.ethical_considerations),
        ),
        (
            "Investment Types",
            joined(&InvestmentType::CHOICES, &prefs.effective_investment_types()),
        ),
    ];

    let mut html = String::from("<section class=\"panel preferences\">\n<h2>Your Preferences</h2>\n<dl>\n");
    for (name, value) in rows {
        html.push_str(&format!("<dt>{name}</dt><dd>{}</dd>\n", escape_html(&value)));
    }
    html.push_str("</dl>\n</section>");
    html
}

pub fn recommendations_page(
    prefs: &InvestmentPreferences,
    recs: &[Recommendation],
    flashes: &[Flash],
) -> String {
    let body = format!(
        r#"<div class="toolbar">
<h1>Your Recommendations</h1>
<button id="{SHUFFLE_BUTTON_ID}" type="button" class="btn">Shuffle Recommendations</button>
<a href="/">Update Profile</a>
</div>
{panel}
{results}"#,
        panel = preferences_panel(prefs),
        results = render_results(recs),
    );
    let scripts = format!("<script>{CARDS_SCRIPT}</script>");
    layout("Recommendations", flashes, &body, &scripts)
}
