use anyhow::{bail, Result};
use folio_contracts::console::{Block, ConsoleExt, TableView};
use folio_contracts::projects::RenderContext;
use indexmap::IndexMap;

use crate::charts::{horizontal_bar_chart, text_bars};
use crate::data::{format_stat, DataTable};

use super::{load_data_file, publish_chart, Project};

const NAMESPACE: &str = Project::Recommendation.slug();
const DATA_FILE: &str = "movies.csv";
const GENRES: [&str; 5] = ["Action", "Comedy", "Drama", "Sci-Fi", "Horror"];

/// Best rated movies across `genres`, highest first.
///
/// A movie listed more than once keeps its first position and its last
/// rating; equal ratings stay in collection order.
pub fn get_recommendations(
    movies: &DataTable,
    genres: &[String],
    count: usize,
) -> Result<Vec<(String, f64)>> {
    if !movies.has_columns(&["Genre", "Movie", "Rating"]) {
        bail!("CSV file must contain 'Genre', 'Movie', and 'Rating' columns.");
    }

    let mut collected: IndexMap<String, f64> = IndexMap::new();
    for genre in genres {
        for row in 0..movies.len() {
            let in_genre = movies
                .value(row, "Genre")
                .is_some_and(|cell| cell.display() == *genre);
            if !in_genre {
                continue;
            }
            let (Some(movie), Some(rating)) = (
                movies.value(row, "Movie").map(|cell| cell.display()),
                movies.value(row, "Rating").and_then(|cell| cell.as_number()),
            ) else {
                continue;
            };
            collected.insert(movie, rating);
        }
    }

    let mut ranked: Vec<(String, f64)> = collected.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(count);
    Ok(ranked)
}

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Simple Recommendation System")?;

    ctx.console.subheader("Select Your Favorite Movie Genres")?;
    let genres: Vec<String> = ctx
        .console
        .multiselect("Choose genres", &GENRES, &[])?
        .into_iter()
        .map(|idx| GENRES[idx].to_string())
        .collect();
    let count = ctx
        .console
        .slider("Number of recommendations", 1.0, 20.0, 5.0)?
        .round() as usize;

    if genres.is_empty() {
        return ctx
            .console
            .info("Please select at least one genre to get recommendations.");
    }

    let Some(movies) = load_data_file(ctx, DATA_FILE, "CSV file not found in the 'data' folder.")?
    else {
        return Ok(());
    };
    let recommendations = match get_recommendations(&movies, &genres, count) {
        Ok(recommendations) => recommendations,
        Err(err) => return ctx.console.error(&err.to_string()),
    };

    ctx.console.subheader("Recommended Movies")?;
    let mut table = TableView::new(&["Movie", "Score"]);
    for (movie, score) in &recommendations {
        table.push_row(vec![movie.clone(), format_stat(*score)]);
    }
    ctx.console.table(table)?;

    if recommendations.is_empty() {
        return Ok(());
    }
    ctx.console.subheader("Recommendation Scores")?;
    ctx.console
        .show(Block::Preformatted(text_bars(&recommendations, 30)))?;
    let scores: Vec<f64> = recommendations.iter().map(|(_, score)| *score).collect();
    publish_chart(
        ctx,
        NAMESPACE,
        "recommendation_scores.png",
        "Recommended Movies and Their Scores",
        |path| horizontal_bar_chart(path, &scores),
    )
}
