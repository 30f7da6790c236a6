use anyhow::Result;
use folio_contracts::console::{Block, ConsoleExt, TableView};
use folio_contracts::projects::RenderContext;
use indexmap::IndexMap;

use crate::charts::{horizontal_bar_chart, text_bars};

use super::{publish_chart, Project};

const NAMESPACE: &str = Project::TextAnalysis.slug();
const TOP_WORDS: usize = 5;
const CLOUD_WORDS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStats {
    pub word_count: usize,
    /// Characters of the raw text, whitespace included.
    pub char_count: usize,
    /// Word counts in first-seen order.
    pub frequencies: IndexMap<String, usize>,
    pub top_words: Vec<(String, usize)>,
}

impl TextStats {
    /// The `n` most frequent words; ties keep first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .frequencies
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

pub fn process_text(text: &str) -> TextStats {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .filter(|word| !word.is_empty())
        .collect();

    let mut frequencies: IndexMap<String, usize> = IndexMap::new();
    for word in &words {
        *frequencies.entry((*word).to_string()).or_insert(0) += 1;
    }

    let mut stats = TextStats {
        word_count: words.len(),
        char_count: text.chars().count(),
        frequencies,
        top_words: Vec::new(),
    };
    stats.top_words = stats.most_common(TOP_WORDS);
    stats
}

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Real-Time Text Analysis")?;

    let text = ctx.console.text_area("Enter your text here")?;
    if text.trim().is_empty() {
        return ctx.console.info("Enter some text to start the analysis!");
    }
    let stats = process_text(&text);

    ctx.console.subheader("Statistics")?;
    ctx.console.write(&format!("Words: {}", stats.word_count))?;
    ctx.console.write(&format!("Characters: {}", stats.char_count))?;

    ctx.console.subheader("Top 5 Most Frequent Words")?;
    let mut top = TableView::new(&["Word", "Frequency"]);
    for (word, count) in &stats.top_words {
        top.push_row(vec![word.clone(), count.to_string()]);
    }
    ctx.console.table(top)?;

    if stats.frequencies.is_empty() {
        return Ok(());
    }
    ctx.console.subheader("Word Cloud")?;
    let cloud: Vec<(String, f64)> = stats
        .most_common(CLOUD_WORDS)
        .into_iter()
        .map(|(word, count)| (word, count as f64))
        .collect();
    ctx.console.show(Block::Preformatted(text_bars(&cloud, 30)))?;
    let counts: Vec<f64> = cloud.iter().map(|(_, count)| *count).collect();
    publish_chart(
        ctx,
        NAMESPACE,
        "word_frequency.png",
        "Word frequency",
        |path| horizontal_bar_chart(path, &counts),
    )
}
