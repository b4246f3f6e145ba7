use console::{style, Term};
use tui_banner::{Align, Banner, ColorMode, Fill, Gradient, GradientDirection, Palette};

const BRAND: u8 = 43;
const DIM: u8 = 240;

const TAGLINE: &str = "Upload Vulnerability Reconnaissance";

/// Print the startup banner with version and an authorization reminder.
pub fn print_banner() {
    let term = Term::stdout();
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = option_env!("GIT_HASH").unwrap_or("dev");

    let (_, term_cols) = term.size();
    let term_w = term_cols as usize;

    let palette = Palette::from_hex(&["#5FFFD7", "#00AFAF", "#005F87"]);
    let gradient = Gradient::new(palette.colors().to_vec(), GradientDirection::Diagonal);

    let banner_text = match Banner::new("MIGR8") {
        Ok(b) if console::colors_enabled() => b
            .gradient(gradient)
            .fill(Fill::Keep)
            .align(Align::Left)
            .trim_vertical(true)
            .color_mode(ColorMode::TrueColor)
            .width(term_w)
            .render(),
        _ => format!("{}\n", style("MIGR8").color256(BRAND).bold()),
    };

    println!();
    print!("{}", banner_text);
    println!(
        "{}  {}",
        style(TAGLINE).white().bold(),
        style(format!("v{} ({})", version, git_hash)).color256(DIM)
    );
    println!(
        "{}",
        style("Only test systems you are explicitly authorized to assess.").yellow()
    );
    println!();
}
