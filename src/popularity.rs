//! Popularity ranking and marker colour assignment.
//!
//! A book's popularity count is the number of libraries reporting it as
//! their most popular title. Books reported by more than one library get
//! distinct palette colours in descending-count order; everything else gets
//! the neutral colour. When there are more popular books than palette
//! entries, the palette cycles.

use crate::models::BookMap;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Marker colours for popular books, assigned in descending-count order.
pub const PALETTE: [&str; 13] = [
    "#665191", "#f95d6a", "#ffa600", "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// Colour for books reported by a single library.
pub const NEUTRAL_COLOUR: &str = "#ffffff";

/// Invert the library → book mapping into book → reporting libraries.
pub fn locations_by_book(books: &BookMap) -> BTreeMap<String, Vec<String>> {
    let mut by_book: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (library, book) in books {
        by_book.entry(book.clone()).or_default().push(library.clone());
    }
    by_book
}

/// Books reported by more than one library, most popular first.
///
/// Ties are broken by title, ascending, so colour assignment is
/// deterministic across runs.
pub fn popular_books(by_book: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    by_book
        .iter()
        .filter(|(_, libraries)| libraries.len() > 1)
        .sorted_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)))
        .map(|(book, _)| book.clone())
        .collect()
}

/// Assign a marker colour to every book.
///
/// Popular books take palette colours in rank order, cycling when the
/// palette runs out; the rest get [`NEUTRAL_COLOUR`].
pub fn book_colours(by_book: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, String> {
    let popular = popular_books(by_book);

    by_book
        .keys()
        .map(|book| {
            let colour = match popular.iter().position(|title| title == book) {
                Some(rank) => PALETTE[rank % PALETTE.len()],
                None => NEUTRAL_COLOUR,
            };
            (book.clone(), colour.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books(entries: &[(&str, &str)]) -> BookMap {
        entries
            .iter()
            .map(|(library, book)| (library.to_string(), book.to_string()))
            .collect()
    }

    #[test]
    fn test_locations_by_book_inverts_the_mapping() {
        let by_book = locations_by_book(&books(&[
            ("Lib1", "X"),
            ("Lib2", "X"),
            ("Lib3", "Y"),
        ]));

        assert_eq!(by_book["X"], ["Lib1", "Lib2"]);
        assert_eq!(by_book["Y"], ["Lib3"]);
    }

    #[test]
    fn test_popularity_ordering_and_colours() {
        // A at 3 libraries, B at 2, C at 1.
        let by_book = locations_by_book(&books(&[
            ("L1", "A"),
            ("L2", "A"),
            ("L3", "A"),
            ("L4", "B"),
            ("L5", "B"),
            ("L6", "C"),
        ]));

        assert_eq!(popular_books(&by_book), ["A", "B"]);

        let colours = book_colours(&by_book);
        assert_eq!(colours["A"], PALETTE[0]);
        assert_eq!(colours["B"], PALETTE[1]);
        assert_eq!(colours["C"], NEUTRAL_COLOUR);
    }

    #[test]
    fn test_popularity_ties_break_by_title() {
        let by_book = locations_by_book(&books(&[
            ("L1", "Zebra"),
            ("L2", "Zebra"),
            ("L3", "Aardvark"),
            ("L4", "Aardvark"),
        ]));

        assert_eq!(popular_books(&by_book), ["Aardvark", "Zebra"]);
    }

    #[test]
    fn test_palette_cycles_when_exhausted() {
        // One more popular book than the palette holds; all counts tie at
        // two, so rank follows title order.
        let mut entries = Vec::new();
        for index in 0..=PALETTE.len() {
            let book = format!("Book {index:02}");
            entries.push((format!("L{index}a"), book.clone()));
            entries.push((format!("L{index}b"), book));
        }
        let book_map: BookMap = entries.into_iter().collect();
        let by_book = locations_by_book(&book_map);

        let colours = book_colours(&by_book);
        assert_eq!(colours["Book 00"], PALETTE[0]);
        assert_eq!(colours[&format!("Book {:02}", PALETTE.len())], PALETTE[0]);
    }
}
