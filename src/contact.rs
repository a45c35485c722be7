//! Contact form hand-off to the visitor's mail client.

/// Characters `encodeURIComponent` leaves alone that `urlencoding` escapes.
const UNESCAPED_MARKS: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

/// What the visitor typed into the contact form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn body(&self) -> String {
        format!(
            "From: {}\nEmail: {}\n\n{}",
            self.name, self.email, self.message
        )
    }
}

/// `mailto:` link addressed to `recipient` with the message as subject and body.
pub fn mailto_link(recipient: &str, message: &ContactMessage) -> String {
    format!(
        "mailto:{recipient}?subject={}&body={}",
        encode_component(&message.subject),
        encode_component(&message.body())
    )
}

/// Percent-encodes a URI component with the same unreserved set as
/// `encodeURIComponent`.
pub fn encode_component(value: &str) -> String {
    // Every `%` in the output opens an escape triple, so the replacements
    // cannot match across a literal `%25`.
    UNESCAPED_MARKS
        .iter()
        .fold(urlencoding::encode(value).into_owned(), |encoded, (escaped, mark)| {
            encoded.replace(escaped, mark)
        })
}
