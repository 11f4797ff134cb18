//! Seed a demo site and print its resolved view trees.
//!
//! Usage:
//!     site-tree            # print every view
//!     site-tree /about     # route a path and print the matched view

use anyhow::{Context, Result};
use trellis_editor::{Site, ViewFields};
use trellis_resolver::ResolvedNode;
use trellis_store::ComponentConfig;
use trellis_workspace::Snapshot;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let site = seed_site()?;
    let snapshot = Snapshot::capture(&site)?;

    match std::env::args().nth(1) {
        Some(path) => {
            let matched = site
                .route_path(&path)
                .with_context(|| format!("routing '{path}'"))?;
            let resolved = site.resolve_view(matched.comp_id)?;
            print_view(&matched.name, &matched.path, &resolved);
        }
        None => {
            println!("{} ({} views)", snapshot.site_name, snapshot.views.len());
            for view in &snapshot.views {
                println!();
                let resolved = site.resolve_view(view.comp_id)?;
                print_view(&view.name, &view.path, &resolved);
            }
        }
    }
    Ok(())
}

fn seed_site() -> Result<Site> {
    let mut site = Site::new("demo site");

    let (home, home_root) = site.create_view(ViewFields {
        path: "/".to_string(),
        name: "Home".to_string(),
        title: "Welcome".to_string(),
        browser_title: "home".to_string(),
        description: Some("demo landing page".to_string()),
        is_home: true,
    })?;
    site.set_default_home_node_id(Some(home_root))?;

    site.add_component_to_view(
        home,
        ComponentConfig::Section {
            text: "Hello there".to_string(),
            level: "h1".to_string(),
        },
        None,
    )?;
    let (_, _, list) = site.add_component_to_view(
        home,
        ComponentConfig::ListContainer {
            list_type: "view".to_string(),
            display_mode: "cards".to_string(),
            name: Some("Recent work".to_string()),
            show_name: true,
        },
        None,
    )?;
    site.add_child_to_node(
        Some(list),
        None,
        ComponentConfig::ExperienceCard {
            position: "Engineer".to_string(),
            company: "Example Co".to_string(),
            start_date: "2022".to_string(),
            end_date: "Present".to_string(),
            image: None,
            content: "Built things.".to_string(),
        },
        None,
    )?;

    let (about, _) = site.create_view(ViewFields {
        path: "/about".to_string(),
        name: "About".to_string(),
        title: "About me".to_string(),
        browser_title: "about".to_string(),
        description: None,
        is_home: false,
    })?;
    site.add_component_to_view(
        about,
        ComponentConfig::Markdown {
            content_key: "about-body".to_string(),
            content: "Hi, I write software.".to_string(),
        },
        None,
    )?;

    Ok(site)
}

fn print_view(name: &str, path: &str, resolved: &ResolvedNode) {
    println!("{name} (comp={})", resolved.comp_id);
    println!("├── path: {path}");
    println!("└── components: ({} total)", resolved.children.len());
    for (i, child) in resolved.children.iter().enumerate() {
        print_node(child, "    ", i == resolved.children.len() - 1);
    }
}

fn print_node(node: &ResolvedNode, prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };
    println!("{prefix}{connector}{}{}", node.component_type, label(node));
    let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
    for (i, child) in node.children.iter().enumerate() {
        print_node(child, &child_prefix, i == node.children.len() - 1);
    }
}

fn label(node: &ResolvedNode) -> String {
    let pick = |key: &str| {
        node.config
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| format!(" (\"{s}\")"))
    };
    pick("text")
        .or_else(|| pick("name"))
        .or_else(|| pick("title"))
        .or_else(|| pick("position"))
        .unwrap_or_default()
}
