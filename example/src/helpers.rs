//! Demo helpers used by the example templates

use mustache_helpers::{HelperRegistry, Locale, RegistryError, Value, helper};

/// Formats an amount with two decimals and the locale's currency symbol
pub fn format_currency(locale: &Locale, amount: f64) -> String {
    let fixed = format!("{:.2}", amount);
    let number = fixed.replace('.', locale.decimal_separator().encode_utf8(&mut [0; 4]));
    match locale.tag() {
        "en-GB" => format!("£{}", number),
        "en-US" => format!("${}", number),
        "de-DE" | "fr-FR" => format!("{} €", number),
        "ru-RU" => format!("{} ₽", number),
        _ => number,
    }
}

pub fn inline() -> Result<HelperRegistry, RegistryError> {
    HelperRegistry::builder()
        .register(
            "FormatCurrency",
            helper!(|ctx, amount: f64| format_currency(ctx.locale(), amount)),
        )
        .register("Multiply", helper!(|_, a: f64, b: f64| a * b))
        .register(
            "DefaultMe",
            helper!(|_, value: String, fallback: String| {
                if value.is_empty() { fallback } else { value }
            }),
        )
        .build()
}

pub fn sections() -> Result<HelperRegistry, RegistryError> {
    HelperRegistry::builder()
        .register(
            "IfEquals",
            helper!(|_, left: String, right: String| left == right),
        )
        .register(
            "Range",
            helper!(|_, start: i64, count: i64| {
                (start..start.saturating_add(count)).map(Value::Int).collect::<Vec<_>>()
            }),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mustache_helpers::{HelperExtensions, Mustache, RenderSettings};
    use serde_json::json;

    fn mustache() -> Mustache {
        let inline = inline().unwrap();
        let sections = sections().unwrap();
        Mustache::builder()
            .configure(|settings| {
                settings.add_helpers(inline).add_section_helpers(sections);
            })
            .build()
    }

    #[test]
    fn currency_follows_locale() {
        assert_eq!(format_currency(&Locale::EN_GB, 10.0), "£10.00");
        assert_eq!(format_currency(&Locale::DE_DE, 100.256), "100,26 €");
        assert_eq!(format_currency(&Locale::INVARIANT, 1.5), "1.50");
    }

    #[test]
    fn renders_an_invoice_line() {
        let view = json!({ "Item": "Tea", "Price": 2.5, "Quantity": 3, "Status": "paid" });
        let out = mustache()
            .render_with(
                //language=mustache
                "{{Item}} x{{Quantity}}: {{FormatCurrency Price}} = {{Multiply Price Quantity}}\
                 {{#IfEquals Status 'paid'}} (paid){{/IfEquals}}",
                view,
                &RenderSettings::with_locale(Locale::EN_GB),
            )
            .unwrap();
        assert_eq!(out, "Tea x3: £2.50 = 7.5 (paid)");
    }

    #[test]
    fn ranges_and_defaults() {
        let out = mustache()
            .render(
                "{{#Range 1 3}}{{.}};{{/Range}} {{DefaultMe Nickname 'none'}}",
                json!({ "Nickname": "" }),
            )
            .unwrap();
        assert_eq!(out, "1;2;3; none");
    }
}
