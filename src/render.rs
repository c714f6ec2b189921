use tera::{Context, Tera};

use crate::error::Error;
use crate::stats::StatsView;

/// Template environment with the page templates compiled into the binary.
pub fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("index.html", include_str!("../templates/index.html")),
        ("home.html", include_str!("../templates/home.html")),
    ])?;
    Ok(tera)
}

pub fn render_index(tera: &Tera) -> Result<String, Error> {
    Ok(tera.render("index.html", &Context::new())?)
}

pub fn render_home(tera: &Tera, stats: &StatsView) -> Result<String, Error> {
    let mut context = Context::new();
    context.insert("top_tracks", &stats.top_tracks);
    context.insert("top_artists", &stats.top_artists);
    context.insert("recommended_tracks", &stats.recommended_tracks);
    Ok(tera.render("home.html", &context)?)
}
