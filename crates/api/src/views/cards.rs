use super::{escape_html, fmt_pct};
use std::fmt::Write;
use stockpick_core::domain::recommendation::Recommendation;
use stockpick_core::domain::stock::RiskTier;

pub const GRID_ID: &str = "recommendations-grid";
pub const NO_RESULTS_ID: &str = "no-results";
pub const SHUFFLE_BUTTON_ID: &str = "shuffle-btn";

fn render_card(out: &mut String, rec: &Recommendation) {
    let s = &rec.stock;
    let tier = RiskTier::from_beta(s.beta);
    let symbol = escape_html(&s.symbol);
    let _ = write!(
        out,
        r#"<div class="card" data-symbol="{symbol}">
<div class="card-header"><h3>{name}</h3><span class="symbol">{symbol}</span></div>
<span class="badge sector">{sector}</span>
<dl>
<dt>Historical Return</dt><dd class="return">{ret}</dd>
<dt>Risk Level</dt><dd class="risk risk-{tier_class}">{tier}</dd>
<dt>Dividend Yield</dt><dd class="dividend">{dividend}</dd>
</dl>
<a class="btn" href="/projections/{path}">View Projections</a>
</div>
"#,
        path = urlencoding::encode(&s.symbol),
        name = escape_html(&s.name),
        sector = escape_html(&s.sector),
        ret = fmt_pct(s.historical_return),
        tier_class = tier.label().to_ascii_lowercase(),
        dividend = fmt_pct(Some(s.dividend_yield)),
    );
}

/// Cards in input order, one per record.
pub fn render_cards(recs: &[Recommendation]) -> String {
    let mut out = String::new();
    for rec in recs {
        render_card(&mut out, rec);
    }
    out
}

/// Grid plus no-results panel; exactly one of the two is visible.
pub fn render_results(recs: &[Recommendation]) -> String {
    let (grid_style, empty_style) = if recs.is_empty() {
        (r#" style="display:none""#, "")
    } else {
        ("", r#" style="display:none""#)
    };
    format!(
        r#"<div id="{GRID_ID}" class="grid"{grid_style}>
{cards}</div>
<div id="{NO_RESULTS_ID}" class="panel"{empty_style}>
<h3>No matching investments</h3>
<p>Try adjusting your investment profile to widen the search.</p>
<a class="btn" href="/">Update Profile</a>
</div>"#,
        cards = render_cards(recs),
    )
}

/// Client-side twin of `render_results` plus the shuffle button handler.
pub const CARDS_SCRIPT: &str = r#"
function riskTier(beta) {
  if (beta < 0.8) return 'Low';
  if (beta > 1.2) return 'High';
  return 'Medium';
}

function formatPct(value) {
  if (value === null || value === undefined || !isFinite(value)) return 'N/A';
  return Number(value).toFixed(2) + '%';
}

function escapeHtml(value) {
  return String(value === null || value === undefined ? '' : value)
    .replace(/&/g, '&amp;')
    .replace(/</g, '&lt;')
    .replace(/>/g, '&gt;')
    .replace(/"/g, '&quot;')
    .replace(/'/g, '&#x27;');
}

function renderCard(stock) {
  const tier = riskTier(stock.beta);
  const symbol = escapeHtml(stock.symbol);
  return '<div class="card" data-symbol="' + symbol + '">' +
    '<div class="card-header"><h3>' + escapeHtml(stock.name) + '</h3><span class="symbol">' + symbol + '</span></div>' +
    '<span class="badge sector">' + escapeHtml(stock.sector) + '</span>' +
    '<dl>' +
    '<dt>Historical Return</dt><dd class="return">' + formatPct(stock.historical_return) + '</dd>' +
    '<dt>Risk Level</dt><dd class="risk risk-' + tier.toLowerCase() + '">' + tier + '</dd>' +
    '<dt>Dividend Yield</dt><dd class="dividend">' + formatPct(stock.dividend_yield) + '</dd>' +
    '</dl>' +
    '<a class="btn" href="/projections/' + encodeURIComponent(stock.symbol) + '">View Projections</a>' +
    '</div>';
}

function renderCards(recommendations) {
  const grid = document.getElementById('recommendations-grid');
  const empty = document.getElementById('no-results');
  if (!Array.isArray(recommendations) || recommendations.length === 0) {
    grid.innerHTML = '';
    grid.style.display = 'none';
    empty.style.display = '';
    return;
  }
  empty.style.display = 'none';
  grid.style.display = '';
  grid.innerHTML = recommendations.map(renderCard).join('');
}

async function shuffleRecommendations() {
  const button = document.getElementById('shuffle-btn');
  button.disabled = true;
  try {
    let recommendations = [];
    try {
      const response = await fetch('/shuffle', { headers: { 'Accept': 'application/json' } });
      if (response.ok) {
        const data = await response.json();
        if (data && !data.error && Array.isArray(data.recommendations)) {
          recommendations = data.recommendations;
        }
      }
    } catch (err) {
      console.error('shuffle failed', err);
    }
    renderCards(recommendations);
  } finally {
    button.disabled = false;
  }
}

document.addEventListener('DOMContentLoaded', function () {
  const button = document.getElementById('shuffle-btn');
  if (button) button.addEventListener('click', shuffleRecommendations);
});
"#;
