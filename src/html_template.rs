use std::collections::BTreeMap;

use crate::controller::PageController;
use crate::filter::FilterController;
use crate::gallery::{FilterMenus, GalleryItem, HeroBackground};
use crate::guards::GuardRules;
use crate::lightbox::LightboxView;
use crate::map::{BaseLayer, LeafletMap, ListKind, LocationLists};
use crate::page::{ControlView, NAV_PANEL_ID};
use crate::settings::Settings;
use crate::slider::{ColumnLayout, SliderState};

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Everything the page template reads.
pub struct PageContext<'a> {
    pub items: &'a [GalleryItem],
    pub menus: &'a FilterMenus,
    pub filters: Option<&'a FilterController>,
    pub sliders: Vec<SliderState>,
    pub column_style: String,
    pub hero: Option<&'a HeroBackground>,
    pub lightbox: Option<&'a LightboxView>,
    pub lists: &'a LocationLists,
    pub map_script: String,
    pub active_layer: BaseLayer,
    pub active_list: ListKind,
    /// Page session the browser sends back with every API call
    pub session: Option<u64>,
}

impl<'a> PageContext<'a> {
    pub fn from_controller(page: &'a PageController<LeafletMap>, lists: &'a LocationLists, session: u64) -> Self {
        let map = page.map();
        Self {
            items: page.items(),
            menus: page.menus(),
            filters: Some(page.filters()),
            sliders: page.slider_states(),
            column_style: page.column_style(),
            hero: page.hero(),
            lightbox: page.lightbox().and_then(|lb| lb.current()),
            lists,
            map_script: map.map(|m| m.provider().full_script()).unwrap_or_default(),
            active_layer: map.map(|m| m.active_layer()).unwrap_or_default(),
            active_list: map.map(|m| m.active_list()).unwrap_or(ListKind::Original),
            session: Some(session),
        }
    }
}

/// The page before any state exists; used to find out which anchors it has.
pub fn render_shell(settings: &Settings, lists: &LocationLists) -> String {
    let columns = ColumnLayout::new(settings.column_count, settings.slider_min, settings.slider_max);
    let menus = FilterMenus::default();
    let ctx = PageContext {
        items: &[],
        menus: &menus,
        filters: None,
        sliders: ControlView::ALL.into_iter().map(|v| columns.bind(v).state()).collect(),
        column_style: columns.css_variable(),
        hero: None,
        lightbox: None,
        lists,
        map_script: String::new(),
        active_layer: BaseLayer::Satellite,
        active_list: ListKind::Original,
        session: None,
    };
    render_page(&ctx)
}

#[cfg(test)]
pub fn page_shell_for_detection() -> String {
    let lists = LocationLists { original: Some(vec![]), detailed: Some(vec![]) };
    render_shell(&Settings::default(), &lists)
}

/// One gallery entry, tagged with its facet values.
pub fn render_item(item: &GalleryItem) -> String {
    let r = &item.record;
    format!(
        r#"<div class="{classes}" data-id="{id}" data-orientation="{orientation}" data-location="{location}" data-year="{year}">
    <img src="{src}" alt="{alt}" loading="lazy">
    <div class="overlay">
        <div class="text">
            <strong>{location}</strong><br>
            <small>{season} • {shot_on}</small>
        </div>
    </div>
</div>"#,
        classes = item.visibility.classes(),
        id = item.id,
        orientation = item.orientation,
        location = html_escape(&r.location),
        year = html_escape(&r.year),
        src = html_escape(&r.image_link),
        alt = html_escape(&r.alt_text()),
        season = html_escape(&r.season),
        shot_on = html_escape(&r.shot_on),
    )
}

fn menu_item(attr: &str, value: &str, label: &str, active: bool) -> String {
    format!(
        r##"<li><a class="dropdown-item{active}" href="#" data-{attr}="{value}">{label}</a></li>"##,
        active = if active { " active" } else { "" },
        value = html_escape(value),
        label = html_escape(label),
    )
}

/// Dropdown entries keyed by the menu element id they belong in.
pub fn render_menu_entries(menus: &FilterMenus, filters: Option<&FilterController>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let locations: String = menus
        .locations
        .iter()
        .map(|e| menu_item("location", &e.value, &e.label, filters.is_some_and(|f| f.is_active_location(&e.value))))
        .collect();
    let years: String = menus
        .years
        .iter()
        .map(|e| menu_item("year", &e.value, &e.label, filters.is_some_and(|f| f.is_active_year(&e.value))))
        .collect();

    for view in ControlView::ALL {
        out.insert(format!("locationMenu{}", view.id_suffix()), locations.clone());
        out.insert(format!("yearMenu{}", view.id_suffix()), years.clone());
    }
    out
}

fn render_controls(ctx: &PageContext<'_>, view: ControlView) -> String {
    let suffix = view.id_suffix();
    let active_orientation = |v: &str| match ctx.filters {
        Some(f) => f.is_active_orientation(v),
        None => v == "all",
    };
    let orientation_buttons: String = [("all", "All"), ("horizontal", "Horizontal"), ("vertical", "Vertical")]
        .iter()
        .map(|(value, label)| {
            format!(
                r#"<button type="button" class="btn btn-outline-light btn-sm{}" data-filter="{}">{}</button>"#,
                if active_orientation(*value) { " active" } else { "" },
                value,
                label
            )
        })
        .collect();

    let entries = render_menu_entries(ctx.menus, ctx.filters);
    let location_label = ctx.filters.map(|f| f.location_label()).unwrap_or_else(|| "All Locations".to_string());
    let year_label = ctx.filters.map(|f| f.year_label()).unwrap_or_else(|| "All Years".to_string());
    let all_location_active = ctx.filters.map_or(true, |f| f.is_active_location("all"));
    let all_year_active = ctx.filters.map_or(true, |f| f.is_active_year("all"));

    let slider = ctx
        .sliders
        .iter()
        .find(|s| s.view == view)
        .map(|s| {
            format!(
                r#"<input type="range" class="column-slider" id="columnSlider{suffix}" data-view="{view}" min="{min}" max="{max}" value="{value}" style="background-size: {bg}">
                <span id="columnValue{suffix}">{label}</span>"#,
                view = match view {
                    ControlView::Desktop => "desktop",
                    ControlView::Mobile => "mobile",
                },
                min = s.min,
                max = s.max,
                value = s.value,
                bg = s.background_size,
                label = s.label,
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="filter-bar filter-bar-{lower}">
            <div class="btn-group">{orientation_buttons}</div>
            <div class="dropdown">
                <button class="btn btn-sm dropdown-toggle" id="locationDropdown{suffix}" data-bs-toggle="dropdown"><span data-location-label>{location_label}</span></button>
                <ul class="dropdown-menu" id="locationMenu{suffix}">{all_location}{locations}</ul>
            </div>
            <div class="dropdown">
                <button class="btn btn-sm dropdown-toggle" id="yearDropdown{suffix}" data-bs-toggle="dropdown"><span data-year-label>{year_label}</span></button>
                <ul class="dropdown-menu" id="yearMenu{suffix}">{all_year}{years}</ul>
            </div>
            <button class="btn btn-primary btn-sm" id="applyFilters{suffix}" data-apply="{lower}">Apply</button>
            {slider}
        </div>"#,
        lower = suffix.to_lowercase(),
        location_label = html_escape(&location_label),
        year_label = html_escape(&year_label),
        all_location = menu_item("location", "all", "All Locations", all_location_active),
        all_year = menu_item("year", "all", "All Years", all_year_active),
        locations = entries.get(&format!("locationMenu{suffix}")).cloned().unwrap_or_default(),
        years = entries.get(&format!("yearMenu{suffix}")).cloned().unwrap_or_default(),
    )
}

fn render_location_list(lists: &LocationLists, kind: ListKind) -> String {
    let Some(entries) = lists.get(kind) else {
        return String::new();
    };
    let items: String = entries
        .iter()
        .map(|e| {
            format!(
                r#"<li class="location-item" data-name="{}">{}</li>"#,
                html_escape(&e.name),
                html_escape(&e.coordinates)
            )
        })
        .collect();
    format!(r#"<ul class="location-list" id="{}">{}</ul>"#, kind.container_id(), items)
}

pub fn render_page(ctx: &PageContext<'_>) -> String {
    let items: String = ctx.items.iter().map(render_item).collect();
    let hero_style = ctx.hero.map(|h| html_escape(&h.style())).unwrap_or_default();
    let (lightbox_class, lightbox_src, lightbox_caption) = match ctx.lightbox {
        Some(view) => (" class=\"open\"", html_escape(&view.image_link), html_escape(&view.caption)),
        None => ("", String::new(), String::new()),
    };

    let view_buttons: String = BaseLayer::ALL
        .iter()
        .map(|layer| {
            format!(
                r#"<button class="btn btn-sm{}" data-map-view="{}">{}</button>"#,
                if *layer == ctx.active_layer { " active" } else { "" },
                layer.name(),
                layer.label()
            )
        })
        .collect();
    let list_buttons: String = [ListKind::Original, ListKind::Detailed]
        .iter()
        .map(|kind| {
            format!(
                r#"<button class="btn btn-sm{}" data-map-list="{}">{}</button>"#,
                if *kind == ctx.active_list { " active" } else { "" },
                kind.name(),
                if *kind == ListKind::Original { "Places" } else { "Detailed" }
            )
        })
        .collect();

    let config = serde_json::json!({
        "session": ctx.session,
        "navPanelId": NAV_PANEL_ID,
        "guards": GuardRules::default(),
    });

    fill_template(
        PAGE_HTML,
        &[
            ("HERO_STYLE", &hero_style),
            ("DESKTOP_CONTROLS", &render_controls(ctx, ControlView::Desktop)),
            ("MOBILE_CONTROLS", &render_controls(ctx, ControlView::Mobile)),
            ("NAV_PANEL_ID", NAV_PANEL_ID),
            ("COLUMN_STYLE", &ctx.column_style),
            ("GALLERY_ITEMS", &items),
            ("LIGHTBOX_CLASS", lightbox_class),
            ("LIGHTBOX_SRC", &lightbox_src),
            ("LIGHTBOX_CAPTION", &lightbox_caption),
            ("MAP_VIEW_BUTTONS", &view_buttons),
            ("MAP_LIST_BUTTONS", &list_buttons),
            ("ORIGINAL_LIST", &render_location_list(ctx.lists, ListKind::Original)),
            ("DETAILED_LIST", &render_location_list(ctx.lists, ListKind::Detailed)),
            ("PAGE_CONFIG", &config.to_string()),
            ("MAP_SCRIPT", &ctx.map_script),
        ],
    )
}

/// Substitute `{{NAME}}` placeholders in one pass. Inserted values are never
/// scanned again; unknown placeholders are kept as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

// HTML template for the gallery page
const PAGE_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Pixel Alchemy</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <link rel="stylesheet" href="/style.css">
</head>
<body>
    <nav class="navbar navbar-dark bg-dark navbar-expand-lg">
        <div class="container-fluid">
            <span class="navbar-brand">Pixel Alchemy</span>
            <button class="navbar-toggler" type="button" data-bs-toggle="collapse" data-bs-target="#{{NAV_PANEL_ID}}">
                <span class="navbar-toggler-icon"></span>
            </button>
            <div class="d-none d-lg-flex">{{DESKTOP_CONTROLS}}</div>
            <div class="collapse navbar-collapse d-lg-none" id="{{NAV_PANEL_ID}}">{{MOBILE_CONTROLS}}</div>
        </div>
    </nav>

    <section class="hero-section" style="{{HERO_STYLE}}">
        <h1>Pixel Alchemy</h1>
    </section>

    <main class="gallery" style="{{COLUMN_STYLE}}">{{GALLERY_ITEMS}}</main>

    <div id="lightbox"{{LIGHTBOX_CLASS}}>
        <span class="lightbox-close">&times;</span>
        <img id="lightbox-img" src="{{LIGHTBOX_SRC}}" alt="">
        <div id="lightbox-caption">{{LIGHTBOX_CAPTION}}</div>
    </div>

    <section class="map-section">
        <div class="map-controls">
            <div class="btn-group">{{MAP_VIEW_BUTTONS}}</div>
            <div class="btn-group">{{MAP_LIST_BUTTONS}}</div>
        </div>
        <div id="map"></div>
        {{ORIGINAL_LIST}}
        {{DETAILED_LIST}}
    </section>

    <script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js"></script>
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script>window.PIXEL_GALLERY = {{PAGE_CONFIG}};</script>
    <script>
{{MAP_SCRIPT}}
    </script>
    <script src="/app.js"></script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::{FilterMenus, ImageRecord, ImageSize};

    fn item() -> GalleryItem {
        GalleryItem::new(
            4,
            ImageRecord {
                image_link: "https://img/x.jpg?a=1&b=2".into(),
                season: "Winter".into(),
                shot_on: "Pixel 6".into(),
                location: "Goa <beach>".into(),
                year: "2022".into(),
            },
            ImageSize { width: 600, height: 900 },
        )
    }

    #[test]
    fn test_item_carries_facet_attributes() {
        let html = render_item(&item());
        assert!(html.contains(r#"data-orientation="vertical""#));
        assert!(html.contains(r#"data-location="Goa &lt;beach&gt;""#));
        assert!(html.contains(r#"data-year="2022""#));
        assert!(html.contains(r#"data-id="4""#));
        assert!(html.contains("x.jpg?a=1&amp;b=2"));
        assert!(html.contains("image-container fade-out"));
    }

    #[test]
    fn test_menu_entries_for_both_views() {
        let menus = FilterMenus::new(["Goa".to_string()], ["2021".to_string(), "2023".to_string()]);
        let entries = render_menu_entries(&menus, None);
        assert_eq!(entries.len(), 4);
        let years = &entries["yearMenuMobile"];
        assert!(years.find("2023").unwrap() < years.find("2021").unwrap());
        assert_eq!(entries["locationMenuDesktop"], entries["locationMenuMobile"]);
    }

    #[test]
    fn test_shell_contains_lists_and_config() {
        let html = page_shell_for_detection();
        assert!(html.contains(r#"id="original-locations""#));
        assert!(html.contains(r#""suppressedEvents":["contextmenu","dragstart"]"#));
        assert!(html.contains(r##"data-bs-target="#navbarNav""##));
        assert!(html.contains(r#"data-map-view="satellite""#));
        assert!(!html.contains("{{"));
    }

    fn record_with(location: &str, image_link: &str) -> ImageRecord {
        ImageRecord {
            image_link: image_link.into(),
            season: "Monsoon".into(),
            shot_on: "Pixel 7".into(),
            location: location.into(),
            year: "2024".into(),
        }
    }

    #[test]
    fn test_hero_link_cannot_leave_style_attribute() {
        let menus = FilterMenus::default();
        let lists = LocationLists::default();
        let hero = HeroBackground { image_link: r#"https://img/a.jpg" onmouseover="alert(1)"#.into() };
        let ctx = PageContext {
            items: &[],
            menus: &menus,
            filters: None,
            sliders: Vec::new(),
            column_style: String::new(),
            hero: Some(&hero),
            lightbox: None,
            lists: &lists,
            map_script: String::new(),
            active_layer: BaseLayer::Satellite,
            active_list: ListKind::Original,
            session: Some(7),
        };
        let html = render_page(&ctx);
        assert!(!html.contains(r#"" onmouseover="#));
        assert!(html.contains("a.jpg&quot; onmouseover=&quot;alert(1)"));
        assert!(html.contains(r#""session":7"#));
    }

    #[test]
    fn test_placeholders_in_content_are_not_expanded() {
        let menus = FilterMenus::default();
        let lists = LocationLists::default();
        let items = [GalleryItem::new(0, record_with("{{MAP_SCRIPT}}", "https://img/b.jpg"), ImageSize { width: 4, height: 3 })];
        let ctx = PageContext {
            items: &items,
            menus: &menus,
            filters: None,
            sliders: Vec::new(),
            column_style: String::new(),
            hero: None,
            lightbox: None,
            lists: &lists,
            map_script: "window.pgMap = 1;".into(),
            active_layer: BaseLayer::Satellite,
            active_list: ListKind::Original,
            session: None,
        };
        let html = render_page(&ctx);
        assert!(html.contains("<strong>{{MAP_SCRIPT}}</strong>"));
        assert_eq!(html.matches("window.pgMap = 1;").count(), 1);
    }

    #[test]
    fn test_fill_template_keeps_unknown_names() {
        assert_eq!(fill_template("a {{X}} {{Y}} {{", &[("X", "{{Y}}")]), "a {{Y}} {{Y}} {{");
    }
}
