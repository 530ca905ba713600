mod ops;

use anyhow::{Context, Result, bail};
use clap::Parser;
use dom::{Document, Id, outline, parse_document, to_html};
use formset::{Command, Effect, Formset, FormsetOptions, Hooks, Page};
use ops::Op;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "rowset")]
#[command(about = "Add and remove rows of a form collection in a markup file")]
struct Cli {
    /// Markup file to load (`-` reads stdin)
    markup: PathBuf,

    /// TOML file with collection options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Collection prefix (overrides the options file)
    #[arg(short, long)]
    prefix: Option<String>,

    /// Step to apply, in order: add, remove:<position> or click:<element-id>
    #[arg(long = "op", value_name = "OP")]
    ops: Vec<Op>,

    /// Print a JSON summary instead of the resulting markup
    #[arg(long)]
    json: bool,

    /// Report the document patches of every step
    #[arg(long)]
    patches: bool,

    /// Print an element outline instead of markup
    #[arg(long, conflicts_with = "json")]
    outline: bool,
}

#[derive(Serialize)]
struct Summary {
    prefix: String,
    total: usize,
    max: Option<usize>,
    add_visible: bool,
    rows: Vec<String>,
    steps: Vec<Step>,
}

#[derive(Serialize)]
struct Step {
    op: String,
    added: Option<u32>,
    removed: Option<u32>,
    renumbered: Vec<u32>,
    total: usize,
    add_visible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    patches: Vec<String>,
}

impl Step {
    fn new(op: &Op, effect: &Effect, with_patches: bool) -> Self {
        Self {
            op: op.to_string(),
            added: effect.added.map(|id| id.0),
            removed: effect.removed.map(|id| id.0),
            renumbered: effect.renumbered.iter().map(|id| id.0).collect(),
            total: effect.total,
            add_visible: effect.add_visible,
            patches: if with_patches {
                effect.patches.iter().map(|patch| format!("{patch:?}")).collect()
            } else {
                Vec::new()
            },
        }
    }
}

fn read_markup(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut markup = String::new();
        std::io::stdin()
            .read_to_string(&mut markup)
            .context("reading markup from stdin")?;
        return Ok(markup);
    }
    fs::read_to_string(path).with_context(|| format!("reading markup from {}", path.display()))
}

fn load_options(path: Option<&Path>, prefix: Option<&str>) -> Result<FormsetOptions> {
    let mut options = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading options from {}", path.display()))?;
            FormsetOptions::from_toml_str(&raw)
                .with_context(|| format!("parsing options from {}", path.display()))?
        }
        None => FormsetOptions::default(),
    };
    if let Some(prefix) = prefix {
        options.prefix = prefix.to_string();
    }
    Ok(options)
}

fn collection<'a>(page: &'a mut Page, prefix: &str) -> Result<&'a mut Formset> {
    page.get_mut(prefix)
        .with_context(|| format!("collection '{prefix}' is not set up"))
}

fn apply(page: &mut Page, doc: &mut Document, prefix: &str, op: &Op) -> Result<Effect> {
    let effect = match op {
        Op::Add => collection(page, prefix)?.add(doc)?,
        Op::Remove(position) => {
            let formset = collection(page, prefix)?;
            let rows = formset.rows(doc);
            let Some(&row) = rows.get(*position) else {
                bail!("no row at position {position}, the collection has {}", rows.len());
            };
            formset.apply(doc, Command::Remove(row))?
        }
        Op::Click(id) => {
            let target = doc
                .element_by_id(id)
                .with_context(|| format!("no element with id '{id}'"))?;
            match page.click(doc, target)? {
                Some(effect) => effect,
                None => {
                    log::warn!(target: "rowset", "click on '{id}' reached no listener");
                    let formset = collection(page, prefix)?;
                    Effect {
                        total: formset.total(),
                        add_visible: formset.add_visible(),
                        patches: doc.take_patches(),
                        ..Effect::default()
                    }
                }
            }
        }
    };
    Ok(effect)
}

fn row_label(doc: &Document, row: Id) -> String {
    doc.attr(row, "id")
        .map(str::to_string)
        .unwrap_or_else(|| row.to_string())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let markup = read_markup(&cli.markup)?;
    let options = load_options(cli.options.as_deref(), cli.prefix.as_deref())?;
    let prefix = options.prefix.clone();

    let mut doc = parse_document(&markup);
    let mut page = Page::new();
    page.setup(&mut doc, options, Hooks::new())
        .with_context(|| format!("setting up collection '{prefix}'"))?;
    let setup_patches = doc.take_patches();
    log::info!(target: "rowset", "'{prefix}' ready, setup produced {} patch(es)", setup_patches.len());

    let mut steps = Vec::with_capacity(cli.ops.len());
    for op in &cli.ops {
        let effect = apply(&mut page, &mut doc, &prefix, op).with_context(|| format!("step {op}"))?;
        if cli.patches && !cli.json {
            for patch in &effect.patches {
                eprintln!("{op}: {patch:?}");
            }
        }
        steps.push(Step::new(op, &effect, cli.patches));
    }

    let formset = collection(&mut page, &prefix)?;
    if cli.json {
        let summary = Summary {
            prefix: prefix.clone(),
            total: formset.total(),
            max: formset.max().limit(),
            add_visible: formset.add_visible(),
            rows: formset
                .rows(&doc)
                .into_iter()
                .map(|row| row_label(&doc, row))
                .collect(),
            steps,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if cli.outline {
        for line in outline(&doc, doc.root()) {
            println!("{line}");
        }
    } else {
        println!("{}", to_html(&doc));
    }
    Ok(())
}
