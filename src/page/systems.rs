use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use super::PageConfig;
use super::entities::{FadeWith, PageElement, PageRefs, SectionNode};
use super::layout::{PageLayout, ScrollState};
use crate::timeline::Sequencer;

const TEXT_COLOR: Color = Color::srgb(0.95, 0.95, 0.92);
const ACCENT: Color = Color::srgb(0.18, 0.55, 0.34);

// ── Startup ─────────────────────────────────────────────────────────

/// Builds the page layout from the window size and spawns one node per section.
pub fn spawn_page(
    mut commands: Commands,
    cfg: Res<PageConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut scroll: ResMut<ScrollState>,
) {
    let viewport = windows
        .single()
        .map(|w| Vec2::new(w.width(), w.height()))
        .unwrap_or(cfg.fallback_viewport);
    let layout = cfg.layout(viewport);
    scroll.max = (layout.height() - viewport.y).max(0.0);

    let root = commands
        .spawn((
            Name::new("Page"),
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                overflow: Overflow::clip(),
                ..default()
            },
        ))
        .id();

    let sections: Vec<Entity> = layout
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let entity = commands
                .spawn((
                    Name::new(section.name.clone()),
                    SectionNode { index },
                    Node {
                        position_type: PositionType::Absolute,
                        top: Val::Px(section.top),
                        width: Val::Percent(100.0),
                        height: Val::Px(section.height),
                        padding: UiRect::horizontal(Val::Percent(10.0)),
                        align_items: AlignItems::Center,
                        ..default()
                    },
                ))
                .id();
            commands.entity(root).add_child(entity);
            entity
        })
        .collect();
    let section = |name: &str| layout.index_of(name).map_or(root, |i| sections[i]);

    // Landing: centered heading, tagline, call to action
    let heading = commands
        .spawn((PageElement::default(), text("Every bin counts", 64.0)))
        .id();
    let paragraph = commands
        .spawn((
            PageElement::default(),
            text("Small habits, one planet. Scroll to see where it all goes.", 22.0),
        ))
        .id();
    let button = commands
        .spawn((
            PageElement::default(),
            Node {
                padding: UiRect::axes(Val::Px(28.0), Val::Px(12.0)),
                margin: UiRect::top(Val::Px(24.0)),
                ..default()
            },
            BackgroundColor(ACCENT),
        ))
        .id();
    let button_label = commands
        .spawn((FadeWith(button), text("Start recycling", 20.0)))
        .id();
    commands.entity(button).add_child(button_label);

    let landing_content = commands
        .spawn((
            Name::new("LandingContent"),
            PageElement::default(),
            Node {
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                ..default()
            },
        ))
        .id();
    commands
        .entity(landing_content)
        .add_children(&[heading, paragraph, button]);
    commands.entity(section("landing")).add_child(landing_content);

    // Section one: left column copy
    let section_one_left = commands
        .spawn((
            Name::new("SectionOneLeft"),
            PageElement::default(),
            Node {
                width: Val::Percent(40.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(12.0),
                ..default()
            },
        ))
        .with_children(|col| {
            col.spawn(text("Sorted at the source", 40.0));
            col.spawn(text(
                "Most of what we throw away can come back as something new, \
                 as long as it lands in the right bin.",
                20.0,
            ));
        })
        .id();
    commands.entity(section("section-one")).add_child(section_one_left);

    // Section two: right-aligned closing copy
    let section_two_content = commands
        .spawn((
            Name::new("SectionTwoContent"),
            Node {
                width: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::FlexEnd,
                row_gap: Val::Px(12.0),
                ..default()
            },
        ))
        .with_children(|col| {
            col.spawn(text("Closer than you think", 40.0));
            col.spawn(text("The planet is the only one we have.", 20.0));
        })
        .id();
    commands
        .entity(section("section-two"))
        .add_child(section_two_content);

    commands.insert_resource(PageRefs {
        landing_content,
        heading,
        paragraph,
        button,
        section_one_left,
    });
    commands.insert_resource(layout);
}

fn text(content: &str, font_size: f32) -> impl Bundle {
    (
        Text::new(content),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(TEXT_COLOR),
    )
}

// ── Update: input ───────────────────────────────────────────────────

/// Mouse wheel, arrow keys, PageUp/PageDown, Space, Home/End.
pub fn scroll_input(
    mut wheel: MessageReader<MouseWheel>,
    keys: Res<ButtonInput<KeyCode>>,
    layout: Res<PageLayout>,
    cfg: Res<PageConfig>,
    mut scroll: ResMut<ScrollState>,
) {
    let mut delta = 0.0;
    for ev in wheel.read() {
        delta -= match ev.unit {
            MouseScrollUnit::Line => ev.y * cfg.line_px,
            MouseScrollUnit::Pixel => ev.y,
        };
    }

    let page = layout.viewport.y * cfg.page_fraction;
    if keys.just_pressed(KeyCode::ArrowDown) {
        delta += cfg.line_px;
    }
    if keys.just_pressed(KeyCode::ArrowUp) {
        delta -= cfg.line_px;
    }
    if keys.just_pressed(KeyCode::PageDown) || keys.just_pressed(KeyCode::Space) {
        delta += page;
    }
    if keys.just_pressed(KeyCode::PageUp) {
        delta -= page;
    }
    if keys.just_pressed(KeyCode::Home) {
        scroll.scroll_to(0.0);
    }
    if keys.just_pressed(KeyCode::End) {
        let max = scroll.max;
        scroll.scroll_to(max);
    }

    if delta != 0.0 {
        scroll.scroll_by(delta);
    }
}

/// Rebuilds the layout for the new viewport and relays out the timeline.
///
/// The scroll offset is rescaled with the viewport so completed segments stay
/// completed.
pub fn handle_resize(
    mut resized: MessageReader<WindowResized>,
    cfg: Res<PageConfig>,
    mut layout: ResMut<PageLayout>,
    mut scroll: ResMut<ScrollState>,
    sequencer: Option<ResMut<Sequencer>>,
) {
    let Some(ev) = resized.read().last() else {
        return;
    };
    let viewport = Vec2::new(ev.width, ev.height);
    if viewport == layout.viewport || viewport.y <= 0.0 {
        return;
    }

    let old = layout.viewport;
    *layout = cfg.layout(viewport);

    let mut document = layout.height();
    if let Some(mut seq) = sequencer {
        match seq.relayout(&layout) {
            Ok(()) => document = seq.document_height(),
            Err(err) => warn!("timeline relayout failed: {err}"),
        }
    }
    scroll.rescale(old.y, viewport.y, document - viewport.y);
}

// ── Update: presentation ────────────────────────────────────────────

/// Positions each section node at its document top minus the scroll offset,
/// plus pin spacing and pin hold from the timeline.
pub fn place_sections(
    layout: Res<PageLayout>,
    scroll: Res<ScrollState>,
    sequencer: Option<Res<Sequencer>>,
    mut sections: Query<(&SectionNode, &mut Node)>,
) {
    for (section, mut node) in &mut sections {
        let Some(bounds) = layout.sections.get(section.index) else {
            continue;
        };
        let (shift, pin) = sequencer.as_ref().map_or((0.0, 0.0), |seq| {
            (
                seq.section_shift(section.index),
                seq.pin_offset(section.index, scroll.offset),
            )
        });
        node.top = Val::Px(bounds.top + shift - scroll.offset + pin);
        node.height = Val::Px(bounds.height);
    }
}

/// Writes [`PageElement`] offsets and opacity into the UI nodes.
#[allow(clippy::type_complexity)]
pub fn apply_page_elements(
    mut elements: Query<(
        &PageElement,
        &ComputedNode,
        &mut Node,
        Option<&mut TextColor>,
        Option<&mut BackgroundColor>,
    )>,
    mut followers: Query<(&FadeWith, &mut TextColor), Without<PageElement>>,
) {
    for (element, computed, mut node, text, background) in &mut elements {
        let height = computed.size().y * computed.inverse_scale_factor();
        node.top = Val::Px(element.offset_y / 100.0 * height);
        if let Some(mut color) = text {
            color.0.set_alpha(element.opacity);
        }
        if let Some(mut color) = background {
            color.0.set_alpha(element.opacity);
        }
    }

    for (fade, mut color) in &mut followers {
        if let Ok((element, ..)) = elements.get(fade.0) {
            color.0.set_alpha(element.opacity);
        }
    }
}
