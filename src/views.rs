//! HTML pages. Built once at startup and shared read-only; every
//! user-supplied string goes through [`escape`].

use std::fmt::Write;

use axum::response::Html;
use time::{format_description::FormatItem, macros::format_description};

use crate::weights::WeightEntry;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub struct LoginPage<'a> {
    pub error: Option<&'a str>,
    pub registered: bool,
}

pub struct RegisterPage<'a> {
    pub error: Option<&'a str>,
    pub username: &'a str,
}

pub struct HomePage<'a> {
    pub username: &'a str,
}

pub struct WeightsPage<'a> {
    pub username: &'a str,
    pub entries: &'a [WeightEntry],
    pub today: Option<&'a WeightEntry>,
}

pub struct Views {
    head: String,
}

impl Views {
    pub fn new(site_name: &str) -> Self {
        let site = escape(site_name);
        let head = format!(
            concat!(
                "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
                "<meta charset=\"utf-8\">\n",
                "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
                "<title>{{title}} · {site}</title>\n",
                "<link rel=\"stylesheet\" href=\"/static/app.css\">\n",
                "<script src=\"https://unpkg.com/htmx.org@1.9.12\"></script>\n",
                "<script src=\"https://cdn.jsdelivr.net/npm/chart.js\"></script>\n",
                "</head>\n<body>\n<header><h1>{site}</h1></header>\n"
            ),
            site = site
        );
        Self { head }
    }

    fn page(&self, title: &str, nav: Option<&str>, body: &str) -> Html<String> {
        let mut out = self.head.replace("{title}", &escape(title));
        if let Some(username) = nav {
            let _ = write!(
                out,
                "<nav><a href=\"/\">Home</a><a href=\"/weights\">History</a>\
                 <span>Signed in as {}</span><a href=\"/logout\">Log out</a></nav>\n",
                escape(username)
            );
        }
        out.push_str("<main>\n");
        out.push_str(body);
        out.push_str("</main>\n</body>\n</html>\n");
        Html(out)
    }

    pub fn login(&self, page: &LoginPage<'_>) -> Html<String> {
        let mut body = String::from("<h2>Log in</h2>\n");
        if page.registered {
            body.push_str("<p class=\"notice\">Account created. You can log in now.</p>\n");
        }
        push_error(&mut body, page.error);
        body.push_str(concat!(
            "<form method=\"post\" action=\"/login\">\n",
            "<label>Username <input name=\"username\" required></label>\n",
            "<label>Password <input name=\"password\" type=\"password\" required></label>\n",
            "<button type=\"submit\">Log in</button>\n",
            "</form>\n",
            "<p>No account? <a href=\"/register\">Register</a></p>\n"
        ));
        self.page("Log in", None, &body)
    }

    pub fn register(&self, page: &RegisterPage<'_>) -> Html<String> {
        let mut body = String::from("<h2>Register</h2>\n");
        push_error(&mut body, page.error);
        let _ = write!(
            body,
            concat!(
                "<form method=\"post\" action=\"/register\">\n",
                "<label>Username <input name=\"username\" value=\"{}\" minlength=\"3\" required></label>\n",
                "<label>Password <input name=\"password\" type=\"password\" minlength=\"6\" required></label>\n",
                "<label>Confirm password <input name=\"confirm_password\" type=\"password\" required></label>\n",
                "<button type=\"submit\">Create account</button>\n",
                "</form>\n",
                "<p>Already registered? <a href=\"/login\">Log in</a></p>\n"
            ),
            escape(page.username)
        );
        self.page("Register", None, &body)
    }

    pub fn home(&self, page: &HomePage<'_>) -> Html<String> {
        let body = concat!(
            "<h2>Today</h2>\n",
            "<form method=\"post\" action=\"/weights/\" hx-post=\"/weights/\" hx-target=\"#weight-list\">\n",
            "<label>Weight (kg) <input name=\"weight\" type=\"number\" step=\"0.1\" min=\"20\" max=\"500\" required></label>\n",
            "<label>Notes <input name=\"notes\"></label>\n",
            "<button type=\"submit\">Save</button>\n",
            "</form>\n",
            "<section id=\"weight-list\" hx-get=\"/weights\" hx-trigger=\"load\" hx-select=\"#weight-list\" hx-swap=\"outerHTML\"></section>\n",
            "<section><canvas id=\"weight-chart\" data-source=\"/api/chart/weight-data\"></canvas></section>\n",
            "<section id=\"weight-stats\" data-source=\"/api/chart/weight-stats\"></section>\n"
        );
        self.page("Home", Some(page.username), body)
    }

    pub fn weights(&self, page: &WeightsPage<'_>) -> Html<String> {
        let mut body = String::from("<h2>History</h2>\n");
        match page.today {
            Some(today) => {
                let _ = writeln!(
                    body,
                    "<p class=\"notice\">Today's entry: {:.1} kg. Submitting again replaces it.</p>",
                    today.weight_kg
                );
            }
            None => body.push_str("<p>No entry for today yet.</p>\n"),
        }
        body.push_str(&self.weight_list(page.entries).0);
        self.page("History", Some(page.username), &body)
    }

    /// The fragment swapped in by htmx after a submission.
    pub fn weight_list(&self, entries: &[WeightEntry]) -> Html<String> {
        let mut out = String::from("<div id=\"weight-list\">\n");
        if entries.is_empty() {
            out.push_str("<p>No entries yet.</p>\n");
        } else {
            out.push_str("<table>\n<tr><th>Date</th><th>Weight (kg)</th><th>Notes</th><th></th></tr>\n");
            for e in entries {
                let date = e.recorded_at.format(DATE_FORMAT).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "<tr id=\"weight-{id}\"><td>{date}</td><td>{kg:.1}</td><td>{notes}</td>\
                     <td><button hx-delete=\"/weights/{id}\" hx-target=\"#weight-{id}\" hx-swap=\"outerHTML\">Delete</button></td></tr>",
                    id = e.id,
                    date = date,
                    kg = e.weight_kg,
                    notes = escape(&e.notes),
                );
            }
            out.push_str("</table>\n");
        }
        out.push_str("</div>\n");
        Html(out)
    }

    pub fn not_found(&self) -> Html<String> {
        self.page(
            "Not found",
            None,
            "<h2>Page not found</h2>\n<p><a href=\"/\">Back to the start</a></p>\n",
        )
    }
}

fn push_error(body: &mut String, error: Option<&str>) {
    if let Some(msg) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(msg));
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn views() -> Views {
        Views::new("Weight Tracker")
    }

    #[test]
    fn escape_covers_markup() {
        assert_eq!(
            escape(r#"<b a="1">'x' & y</b>"#),
            "&lt;b a=&quot;1&quot;&gt;&#x27;x&#x27; &amp; y&lt;/b&gt;"
        );
    }

    #[test]
    fn login_shows_error_and_registered_notice() {
        let html = views()
            .login(&LoginPage {
                error: Some("Invalid username or password"),
                registered: true,
            })
            .0;
        assert!(html.contains("<title>Log in · Weight Tracker</title>"));
        assert!(html.contains("Invalid username or password"));
        assert!(html.contains("Account created"));
    }

    #[test]
    fn register_escapes_echoed_username() {
        let html = views()
            .register(&RegisterPage {
                error: None,
                username: "\"><script>",
            })
            .0;
        assert!(!html.contains("<script>\""));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn weight_list_renders_rows_and_escapes_notes() {
        let at = datetime!(2024-05-01 09:00 UTC);
        let entries = [WeightEntry {
            id: 7,
            user_id: 1,
            weight_kg: 81.4,
            recorded_at: at,
            notes: "<i>post-holiday</i>".into(),
            created_at: at,
            updated_at: at,
        }];
        let html = views().weight_list(&entries).0;
        assert!(html.contains("2024-05-01"));
        assert!(html.contains("81.4"));
        assert!(html.contains("/weights/7"));
        assert!(html.contains("&lt;i&gt;post-holiday&lt;/i&gt;"));
    }

    #[test]
    fn empty_weight_list() {
        assert!(views().weight_list(&[]).0.contains("No entries yet"));
    }
}
