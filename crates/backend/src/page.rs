//! HTML pages
//!
//! Minimal server-rendered pages: a landing page and the upload form, which
//! doubles as the result page.

/// Escapes text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         <nav><a href=\"/index.html\">Home</a> | <a href=\"/prediction.html\">Predict</a> | <a href=\"/logout.html\">Logout</a></nav>\n\
         {body}\n\
         </body>\n\
         </html>\n",
        title = escape_html(title),
        body = body,
    )
}

/// Landing page
pub fn render_index() -> String {
    layout(
        "Vegetable Classification",
        "<h1>Vegetable Classification</h1>\n\
         <p>Upload a photo of a vegetable and the model will tell you what it is.</p>\n\
         <p><a href=\"/prediction.html\">Start predicting</a></p>",
    )
}

/// Upload form, with the outcome of the last prediction if there is one
pub fn render_prediction(result: Option<&str>) -> String {
    let result_block = result.map_or_else(String::new, |text| {
        format!(
            "\n<div class=\"result\"><h2>Prediction</h2><p id=\"pred\">{}</p></div>",
            escape_html(text)
        )
    });

    layout(
        "Predict",
        &format!(
            "<h1>Classify an image</h1>\n\
             <form action=\"/result\" method=\"post\" enctype=\"multipart/form-data\">\n\
             <input type=\"file\" name=\"image\" accept=\"image/*\">\n\
             <button type=\"submit\">Predict</button>\n\
             </form>{result_block}"
        ),
    )
}

/// Page shown after leaving the app
pub fn render_logout() -> String {
    layout(
        "Logged out",
        "<h1>See you soon</h1>\n<p><a href=\"/index.html\">Back to the start page</a></p>",
    )
}
