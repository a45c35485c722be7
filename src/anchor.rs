/// The section id an in-page link points at. A bare `#` and off-page links
/// yield `None` and are left to the browser.
pub fn section_anchor(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Where to scroll so the section clears the fixed header.
pub fn scroll_target(section_top: f64, header_offset: f64) -> f64 {
    (section_top - header_offset).max(0.0)
}

pub fn href_for(section_id: &str) -> String {
    format!("#{section_id}")
}
