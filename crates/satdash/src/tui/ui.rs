//! Drawing.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;
use satdash_globe::ScreenPoint;

use super::app::{App, InputMode, DOTS_PER_CELL};
use crate::globe::Scene;
use crate::render::format_date;

const OCEAN: Color = Color::Rgb(74, 144, 226);
const LAND: Color = Color::Rgb(198, 218, 191);
const GRID: Color = Color::DarkGray;
const MARKER: Color = Color::Rgb(231, 76, 60);
const FRESH_MARKER: Color = Color::Yellow;
const RING: Color = Color::Rgb(150, 60, 50);
const ACCENT: Color = Color::Cyan;

/// Draw the whole dashboard.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let [header, body, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());
    let [list, globe] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(body);

    draw_header(frame, app, header);
    draw_list(frame, app, list);
    draw_globe(frame, app, globe);
    draw_status(frame, app, status);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = app.dashboard();
    let line = Line::from(vec![
        Span::styled("satdash", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw("   Active satellites: "),
        Span::styled(
            dashboard.active_count().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   Last update: "),
        Span::raw(format_date(dashboard.last_update())),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let [bar, rows] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
    let dashboard = app.dashboard();

    let searching = app.mode() == InputMode::Search;
    let mut search = vec![Span::raw("Search: "), Span::raw(dashboard.search().to_string())];
    if searching {
        search.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }
    let bar_style = if searching {
        Style::default().fg(ACCENT)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(Line::from(search)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(bar_style)
                .title(format!(" Sort: {} ", dashboard.sort())),
        ),
        bar,
    );

    let items: Vec<ListItem> = dashboard
        .entries()
        .iter()
        .map(|entry| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    entry.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("  NORAD ID: {}  Updated: {}", entry.norad_id, entry.updated),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();
    let title = format!(" Satellites ({}) ", items.len());
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(title)),
        rows,
    );
}

fn draw_globe(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Globe ");
    let inner = block.inner(area);
    app.set_globe_area(inner);

    let width = f64::from(inner.width) * DOTS_PER_CELL.0;
    let height = f64::from(inner.height) * DOTS_PER_CELL.1;
    let scene = app.globe().scene();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| paint_scene(ctx, scene, height));
    frame.render_widget(canvas, area);
}

/// Canvas y grows upwards, scene y downwards.
fn flip(point: ScreenPoint, height: f64) -> (f64, f64) {
    (point.x, height - point.y)
}

fn paint_runs(ctx: &mut Context, runs: &[Vec<ScreenPoint>], height: f64, color: Color) {
    for run in runs {
        for pair in run.windows(2) {
            let (x1, y1) = flip(pair[0], height);
            let (x2, y2) = flip(pair[1], height);
            ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
        }
    }
}

fn paint_scene(ctx: &mut Context, scene: &Scene, height: f64) {
    let (cx, cy) = flip(scene.center, height);
    ctx.draw(&Circle {
        x: cx,
        y: cy,
        radius: scene.radius,
        color: OCEAN,
    });
    paint_runs(ctx, &scene.graticule, height, GRID);
    ctx.layer();
    paint_runs(ctx, &scene.land, height, LAND);
    ctx.layer();

    for marker in &scene.markers {
        let (x, y) = flip(marker.at, height);
        if let Some(radius) = marker.ring_radius {
            ctx.draw(&Circle {
                x,
                y,
                radius,
                color: RING,
            });
        }
        ctx.draw(&Points {
            coords: &[(x, y)],
            color: if marker.fresh { FRESH_MARKER } else { MARKER },
        });
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let refresh = if app.refresh_enabled() {
        Span::styled("[r] refresh", Style::default().fg(ACCENT))
    } else {
        Span::styled("refreshing...", Style::default().fg(Color::Yellow))
    };
    let help = match app.mode() {
        InputMode::Normal => "  [/] search  [s] sort  [g] grid  drag globe  [q] quit",
        InputMode::Search => "  type to filter  [enter] done  [esc] clear",
    };
    let mut spans = vec![refresh, Span::styled(help, Style::default().fg(Color::Gray))];
    if !app.status().is_empty() {
        spans.push(Span::raw("  | "));
        spans.push(Span::raw(app.status().to_string()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
