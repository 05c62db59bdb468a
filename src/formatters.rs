use crate::constants::CONTENT_PLACEHOLDER;
use crate::dataset::{Dataset, MonthSeries};
use crate::error::Error;

/// Visual tier of a daily max temperature in °F
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureCategory {
    Extreme,
    Hot,
    Warm,
    Mild,
}

impl TemperatureCategory {
    pub fn from_fahrenheit(value: f64) -> Self {
        if value > 100.0 {
            Self::Extreme
        } else if value > 90.0 {
            Self::Hot
        } else if value > 70.0 {
            Self::Warm
        } else {
            Self::Mild
        }
    }

    /// Tachyons background colour suffix, used as `bg-{color}`
    pub fn color(&self) -> &'static str {
        match self {
            Self::Extreme => "dark-red",
            Self::Hot => "red",
            Self::Warm => "yellow",
            Self::Mild => "blue",
        }
    }
}

/// Precipitation bars are this many pixels per inch
const PRECIPITATION_SCALE: f64 = 10.0;

/// Renders one location as an HTML fragment: a heading, then one block per
/// month in dataset order.
pub fn render_dataset(dataset: &Dataset) -> String {
    let mut buf = Vec::new();
    buf.push(format!("<h2 class='mt5'>{}</h2>", escape_html(&dataset.location)));

    for year in &dataset.years {
        buf.push("<div>".to_string());
        for month in &year.months {
            render_month(&mut buf, month);
        }
        buf.push("</div>".to_string());
    }

    buf.join("\n")
}

fn render_month(buf: &mut Vec<String>, month: &MonthSeries) {
    let temperatures = &month.observations.temperatures;

    buf.push("<div class='dib mr3'>".to_string());
    for &temp in temperatures {
        buf.push(format!(
            "<div style=\"width: 10px; height: {}px\" class=\"bg-{} dib mb0\"></div>",
            temp.max(0.0),
            TemperatureCategory::from_fahrenheit(temp).color()
        ));
    }
    buf.push("<br class='mv0'>".to_string());
    for &temp in temperatures {
        buf.push(format!(
            "<span class='b dib' style='width: 10px; font-size: 7px;'>{}</span>",
            temp.round_ties_even() as i64
        ));
    }
    buf.push("<br><div>".to_string());
    for &precip in &month.observations.precipitation {
        buf.push(format!(
            "<div style=\"width: 10px; height: {}px\" class=\"bg-blue dib mb0 v-top\"></div>",
            (precip * PRECIPITATION_SCALE).max(0.0)
        ));
    }
    buf.push("</div>".to_string());
    buf.push(format!(
        "<h3 class='mt1 mb3 tc gray'>{}, {}</h3>",
        month.period.month_name(),
        month.period.year()
    ));
    buf.push("</div>".to_string());
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Substitutes `content` for every `{{ content }}` placeholder in `template`.
///
/// Other `{{ ... }}` expressions are left untouched.
pub fn render_template(template: &str, content: &str) -> Result<String, Error> {
    let mut output = String::with_capacity(template.len() + content.len());
    let mut rest = template;
    let mut substituted = false;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };

        output.push_str(&rest[..open]);
        if after[..close].trim() == CONTENT_PLACEHOLDER {
            output.push_str(content);
            substituted = true;
        } else {
            output.push_str(&rest[open..open + close + 4]);
        }
        rest = &after[close + 2..];
    }
    output.push_str(rest);

    if !substituted {
        return Err(Error::Template(format!(
            "template has no {{{{ {} }}}} placeholder",
            CONTENT_PLACEHOLDER
        )));
    }
    Ok(output)
}
