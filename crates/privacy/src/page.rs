//! Page numbers and completion.

/// Coerce caller-supplied page input to a page number.
///
/// Takes the leading integer of the (whitespace-trimmed) input, the way a
/// loosely-typed caller would cast it. Input without a leading integer, and
/// negative numbers, become `0`; values too large for a `u32` saturate.
///
/// # Examples
///
/// ```
/// use wcpt_privacy::coerce_page;
///
/// assert_eq!(coerce_page("3"), 3);
/// assert_eq!(coerce_page(" 12abc"), 12);
/// assert_eq!(coerce_page("two"), 0);
/// assert_eq!(coerce_page("-4"), 0);
/// ```
pub fn coerce_page(input: &str) -> u32 {
    let input = input.trim_start();
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let end = digits.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(digits.len());
    let digits = &digits[..end];
    if negative || digits.is_empty() {
        return 0;
    }
    digits
        .bytes()
        .fold(0u32, |page, digit| page.saturating_mul(10).saturating_add(u32::from(digit - b'0')))
}

/// Whether `page` is the last page (or past it) of a result set with
/// `max_num_pages` pages.
///
/// An empty result set has zero pages, so its first page is already done.
pub fn is_done(page: u32, max_num_pages: u32) -> bool {
    page >= max_num_pages
}
