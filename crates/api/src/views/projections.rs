use super::{escape_html, fmt_num, fmt_pct, layout, script_json};
use crate::session::Flash;
use serde::Serialize;
use std::fmt::Write;
use stockpick_core::analytics::indicators::TechnicalIndicators;
use stockpick_core::analytics::piotroski::score_label;
use stockpick_core::domain::series::{HistoricalBar, PredictionPoint};
use stockpick_core::domain::stock::{RiskTier, StockInfo};

pub struct ProjectionView<'a> {
    pub symbol: &'a str,
    pub info: Option<&'a StockInfo>,
    pub piotroski: u8,
    pub indicators: &'a TechnicalIndicators,
    pub history: &'a [HistoricalBar],
    pub predictions: &'a [PredictionPoint],
}

#[derive(Serialize)]
struct ChartData<'a> {
    history: &'a [HistoricalBar],
    predictions: &'a [PredictionPoint],
}

const CHART_TEMPLATE: &str = r#"
<script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
<script>
document.addEventListener('DOMContentLoaded', function () {
  const data = __CHART_DATA__;
  const history = data.history || [];
  const predictions = data.predictions || [];
  const pad = function (n) { return new Array(n).fill(null); };

  const labels = history.map(function (b) { return b.Date; })
    .concat(predictions.map(function (p) { return p.date; }));
  const close = history.map(function (b) { return b.Close; }).concat(pad(predictions.length));
  const ma20 = history.map(function (b) { return b.MA20; }).concat(pad(predictions.length));
  const ma50 = history.map(function (b) { return b.MA50; }).concat(pad(predictions.length));
  const predicted = pad(history.length).concat(predictions.map(function (p) { return p.price; }));

  new Chart(document.getElementById('price-chart'), {
    type: 'line',
    data: {
      labels: labels,
      datasets: [
        { label: 'Close', data: close, borderColor: '#1f3a5f', pointRadius: 0 },
        { label: 'MA20', data: ma20, borderColor: '#b45309', pointRadius: 0 },
        { label: 'MA50', data: ma50, borderColor: '#057a55', pointRadius: 0 },
        { label: 'Predicted', data: predicted, borderColor: '#c81e1e', borderDash: [6, 4], pointRadius: 0 }
      ]
    },
    options: { responsive: true, interaction: { mode: 'index', intersect: false } }
  });
});
</script>
"#;

pub fn chart_script(history: &[HistoricalBar], predictions: &[PredictionPoint]) -> String {
    CHART_TEMPLATE.replace(
        "__CHART_DATA__",
        &script_json(&ChartData {
            history,
            predictions,
        }),
    )
}

fn fmt_market_cap(v: f64) -> String {
    if v >= 1e12 {
        format!("${:.2}T", v / 1e12)
    } else if v >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("${:.2}M", v / 1e6)
    } else {
        format!("${v:.0}")
    }
}

pub fn projections_page(view: &ProjectionView<'_>, flashes: &[Flash]) -> String {
    let symbol = escape_html(view.symbol);
    let mut body = String::new();

    match view.info {
        Some(info) => {
            let name = if info.name.is_empty() { view.symbol } else { info.name.as_str() };
            let _ = write!(
                body,
                r#"<h1>{name} <small>({symbol})</small></h1>
<div class="panel"><dl>
<dt>Sector</dt><dd>{sector}</dd>
<dt>Industry</dt><dd>{industry}</dd>
<dt>Market Cap</dt><dd>{cap}</dd>
<dt>Forward P/E</dt><dd>{pe}</dd>
<dt>Dividend Yield</dt><dd>{dy}</dd>
<dt>Beta</dt><dd>{beta} ({tier} risk)</dd>
</dl></div>
"#,
                name = escape_html(name),
                sector = escape_html(&info.sector),
                industry = escape_html(&info.industry),
                cap = fmt_market_cap(info.market_cap),
                pe = fmt_num(Some(info.pe_ratio)),
                dy = fmt_pct(Some(info.dividend_yield * 100.0)),
                beta = fmt_num(Some(info.beta)),
                tier = RiskTier::from_beta(info.beta),
            );
        }
        None => {
            let _ = write!(body, "<h1>{symbol}</h1>\n");
        }
    }

    let ind = view.indicators;
    let _ = write!(
        body,
        r#"<div class="panel"><h2>Financial Health</h2>
<p>Piotroski F-Score: <strong>{score}/9</strong> ({label})</p>
<h2>Technical Indicators</h2><dl>
<dt>RSI (14)</dt><dd>{rsi}</dd>
<dt>MACD</dt><dd>{macd}</dd>
<dt>Bollinger Upper</dt><dd>{upper}</dd>
<dt>Bollinger Lower</dt><dd>{lower}</dd>
</dl></div>
<div class="panel"><h2>Price History and Forecast</h2><canvas id="price-chart" height="120"></canvas></div>
"#,
        score = view.piotroski,
        label = score_label(view.piotroski),
        rsi = fmt_num(ind.rsi),
        macd = fmt_num(ind.macd),
        upper = fmt_num(ind.bollinger_upper),
        lower = fmt_num(ind.bollinger_lower),
    );

    if !view.predictions.is_empty() {
        body.push_str(r#"<div class="panel"><h2>Predicted Prices</h2><table><tr><th>Date</th><th>Price</th></tr>"#);
        for p in view.predictions {
            let _ = write!(body, "<tr><td>{}</td><td>${:.2}</td></tr>", p.date, p.price);
        }
        body.push_str("</table></div>\n");
    }

    body.push_str(r#"<p><a class="btn" href="/recommendations">Back to Recommendations</a></p>"#);

    let title = format!("{} Projections", view.symbol);
    layout(&title, flashes, &body, &chart_script(view.history, view.predictions))
}
