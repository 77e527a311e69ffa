//! Headless grid renderer
//!
//! Renders PNG snapshots from YAML scenario definitions.
//!
//! Usage:
//!   cargo run --bin gridshot -- --scenario screenshots/scenarios/basic.yaml
//!   cargo run --bin gridshot -- --all
//!   cargo run --bin gridshot -- --all --out-dir screenshots/output

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use gridcanvas::dataset::{self, Dataset};
use gridcanvas::geometry::Point;
use gridcanvas::model::{RowKey, SelectionSet};
use gridcanvas::pipeline::{FilterSpec, FilterState, Pagination, SortState, Sorter};
use gridcanvas::theme::Theme;
use gridcanvas::view::{FontdueText, MonospaceText, PixelSurface, TextRenderer};
use gridcanvas::{GridUpdate, GridView, PointerInput, Viewport};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "gridshot", about = "Render grid scenarios to PNG")]
struct Args {
    /// Path to a single scenario YAML file
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Run all scenarios in the scenarios directory
    #[arg(long)]
    all: bool,
    /// Directory containing scenario YAML files
    #[arg(long, default_value = "screenshots/scenarios")]
    scenarios_dir: PathBuf,
    /// Directory for output PNG files
    #[arg(long, default_value = "screenshots/output")]
    out_dir: PathBuf,
    /// Override theme (file path or builtin id)
    #[arg(long)]
    theme: Option<String>,
    /// Font file; placeholder glyphs are drawn without one
    #[arg(long)]
    font: Option<PathBuf>,
    /// Override width in logical pixels
    #[arg(long)]
    width: Option<f32>,
    /// Override height in logical pixels
    #[arg(long)]
    height: Option<f32>,
}

// ---------------------------------------------------------------------------
// Scenario YAML schema
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug)]
struct Scenario {
    name: String,
    #[serde(default = "default_width")]
    width: f32,
    #[serde(default = "default_height")]
    height: f32,
    #[serde(default = "default_scale")]
    scale: f32,
    #[serde(default)]
    theme: Option<String>,
    data: ScenarioData,
    #[serde(default)]
    sort: Vec<ScenarioSort>,
    #[serde(default)]
    filter: BTreeMap<String, ScenarioFilter>,
    #[serde(default)]
    page: Option<ScenarioPage>,
    #[serde(default = "default_true")]
    striped: bool,
    #[serde(default)]
    tree: bool,
    #[serde(default)]
    selected: Vec<u64>,
    #[serde(default)]
    scroll_top: f64,
    #[serde(default)]
    scroll_left: f64,
    /// Pointer position in logical pixels, to show the hover highlight
    #[serde(default)]
    hover: Option<[f32; 2]>,
    #[serde(default)]
    footer: Option<String>,
    /// Width for columns the dataset leaves unsized
    #[serde(default)]
    column_width: Option<f32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum ScenarioData {
    File(PathBuf),
    Mock(usize),
}

#[derive(Deserialize, Debug)]
struct ScenarioSort {
    field: String,
    #[serde(default)]
    descending: bool,
    #[serde(default)]
    priority: Option<u32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum ScenarioFilter {
    Values(Vec<String>),
    Keyword(String),
}

#[derive(Deserialize, Debug)]
struct ScenarioPage {
    page: usize,
    size: usize,
}

fn default_width() -> f32 {
    1024.0
}
fn default_height() -> f32 {
    640.0
}
fn default_scale() -> f32 {
    2.0
}
fn default_true() -> bool {
    true
}

impl Scenario {
    fn sort_state(&self) -> SortState {
        let sorters = self
            .sort
            .iter()
            .map(|s| {
                let sorter = if s.descending {
                    Sorter::desc(&s.field)
                } else {
                    Sorter::asc(&s.field)
                };
                match s.priority {
                    Some(p) => sorter.with_priority(p),
                    None => sorter,
                }
            })
            .collect();
        SortState { sorters }
    }

    fn filter_state(&self) -> FilterState {
        self.filter
            .iter()
            .fold(FilterState::new(), |state, (field, filter)| {
                let spec = match filter {
                    ScenarioFilter::Values(values) => FilterSpec::values(values.iter().cloned()),
                    ScenarioFilter::Keyword(text) => FilterSpec::keyword(text),
                };
                state.with(field, spec)
            })
    }

    fn selection(&self) -> SelectionSet {
        let mut selection = SelectionSet::new();
        for &key in &self.selected {
            selection.select(RowKey(key));
        }
        selection
    }
}

// ---------------------------------------------------------------------------
// Theme and text
// ---------------------------------------------------------------------------

fn load_theme_for_scenario(theme_override: Option<&str>, scenario_theme: Option<&str>) -> Theme {
    let Some(t) = theme_override.or(scenario_theme) else {
        return Theme::default();
    };
    // Try as file path first
    let path = PathBuf::from(t);
    if path.exists() {
        match gridcanvas::theme::from_file(&path) {
            Ok(theme) => return theme,
            Err(e) => eprintln!("Warning: failed to load theme file {}: {}", t, e),
        }
    }
    match gridcanvas::theme::load_theme(t) {
        Ok(theme) => theme,
        Err(e) => {
            eprintln!("Warning: failed to load theme '{}': {}, using default", t, e);
            Theme::default()
        }
    }
}

fn text_renderer(font: Option<&Path>) -> Result<Box<dyn TextRenderer>> {
    match font {
        Some(path) => {
            let text = FontdueText::load(path).with_context(|| format!("loading font {}", path.display()))?;
            Ok(Box::new(text))
        }
        None => Ok(match FontdueText::system_default() {
            Ok(text) => Box::new(text),
            Err(_) => Box::new(MonospaceText::new()),
        }),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn load_data(data: &ScenarioData) -> Result<Dataset> {
    match data {
        ScenarioData::File(path) => dataset::load(path).with_context(|| format!("loading {}", path.display())),
        ScenarioData::Mock(count) => Ok(Dataset::mock(*count)),
    }
}

fn render_scenario(scenario: &Scenario, theme: Theme, text: Box<dyn TextRenderer>) -> Result<PixelSurface> {
    let mut data = load_data(&scenario.data)?;
    if let Some(width) = scenario.column_width {
        data = data.with_default_width(width);
    }
    let viewport = Viewport::new(scenario.width, scenario.height, scenario.scale);
    let mut grid = GridView::create(Some(PixelSurface::new(0, 0)), viewport, theme, text);

    grid.update(
        GridUpdate::new()
            .columns(data.columns)
            .rows(data.rows)
            .sort(scenario.sort_state())
            .filter(scenario.filter_state())
            .page(scenario.page.as_ref().map(|p| Pagination::new(p.page, p.size)))
            .selection(scenario.selection())
            .striped(scenario.striped)
            .tree(scenario.tree)
            .footer(scenario.footer.clone()),
    );
    for diagnostic in grid.diagnostics() {
        eprintln!("\n    warning: {}", diagnostic);
    }

    grid.set_scroll_top(scenario.scroll_top);
    grid.set_scroll_left(scenario.scroll_left);
    if let Some([x, y]) = scenario.hover {
        grid.handle_pointer(PointerInput::Move(viewport.to_device(Point::new(x, y))));
    }

    grid.surface().cloned().context("grid has no surface")
}

// ---------------------------------------------------------------------------
// PNG output
// ---------------------------------------------------------------------------

fn save_png(surface: &PixelSurface, path: &Path) -> Result<()> {
    let img = image::RgbaImage::from_raw(surface.width() as u32, surface.height() as u32, surface.to_rgba8())
        .context("failed to create image buffer")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent.display()))?;
    }

    img.save(path)
        .with_context(|| format!("saving PNG to {}", path.display()))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Scenario loading
// ---------------------------------------------------------------------------

fn load_scenario(path: &Path) -> Result<Scenario> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading scenario {}", path.display()))?;
    let scenario: Scenario =
        serde_yaml::from_str(&content).with_context(|| format!("parsing scenario {}", path.display()))?;
    Ok(scenario)
}

fn collect_scenarios(args: &Args) -> Result<Vec<(PathBuf, Scenario)>> {
    let mut scenarios = Vec::new();

    if let Some(ref path) = args.scenario {
        let scenario = load_scenario(path)?;
        scenarios.push((path.clone(), scenario));
    } else if args.all {
        if !args.scenarios_dir.exists() {
            anyhow::bail!("scenarios directory does not exist: {}", args.scenarios_dir.display());
        }
        let mut entries: Vec<_> = std::fs::read_dir(&args.scenarios_dir)
            .with_context(|| format!("reading scenarios dir {}", args.scenarios_dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "yaml" || ext == "yml"))
            .collect();
        entries.sort();

        for path in entries {
            match load_scenario(&path) {
                Ok(scenario) => scenarios.push((path, scenario)),
                Err(e) => eprintln!("Warning: skipping {}: {:#}", path.display(), e),
            }
        }

        if scenarios.is_empty() {
            anyhow::bail!("no scenario files found in {}", args.scenarios_dir.display());
        }
    } else {
        anyhow::bail!("specify --scenario <file> or --all");
    }

    Ok(scenarios)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    gridcanvas::tracing::init();

    let args = Args::parse();
    let scenarios = collect_scenarios(&args)?;

    eprintln!("Rendering {} scenario(s) → {}", scenarios.len(), args.out_dir.display());

    for (_path, mut scenario) in scenarios {
        if let Some(w) = args.width {
            scenario.width = w;
        }
        if let Some(h) = args.height {
            scenario.height = h;
        }

        let theme = load_theme_for_scenario(args.theme.as_deref(), scenario.theme.as_deref());
        let text = text_renderer(args.font.as_deref())?;

        eprint!("  {} ...", scenario.name);
        let surface = render_scenario(&scenario, theme, text)?;

        let out_path = args.out_dir.join(format!("grid-{}.png", scenario.name));
        save_png(&surface, &out_path)?;
        eprintln!(" saved {}", out_path.display());
    }

    eprintln!("Done!");
    Ok(())
}
