// src/tui/mod.rs
use crate::core::context::{BotContext, StatusReport};
use crate::types::{Position, Snapshot, Trade, TradeAction};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};
use rust_decimal::Decimal;
use std::{io, time::Duration};

/// Snapshot of everything the dashboard draws, copied out of the shared
/// state once per refresh so rendering never holds a lock.
pub struct App {
    pub status: StatusReport,
    pub market: Vec<Snapshot>,
    pub positions: Vec<Position>,
    pub trades: Vec<Trade>,
}

impl App {
    async fn refresh(ctx: &BotContext) -> Self {
        Self {
            status: ctx.status().await,
            market: ctx.market_data().await,
            positions: ctx.positions().await,
            trades: ctx.trades().await,
        }
    }
}

/// Keys: `s` start, `x` stop, `q` quit.
pub async fn run(ctx: BotContext) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        let app = App::refresh(&ctx).await;
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('s') => {
                        ctx.start().await;
                    }
                    KeyCode::Char('x') => {
                        ctx.stop().await;
                    }
                    _ => {}
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

fn pnl_style(pnl: Decimal) -> Style {
    if pnl < Decimal::ZERO {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}

fn ui(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Min(6),
                Constraint::Length(8),
            ]
            .as_ref(),
        )
        .split(f.size());

    let status = &app.status;
    let state_style = if status.running {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled("Paperhawk ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(status.loop_state, state_style),
        Span::raw(format!(" | Balance: ${:.2}", status.balance)),
        Span::styled(
            format!(" | Equity: ${:.2}", status.equity),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" | Day PnL: {:.2}", status.daily_realized_pnl),
            pnl_style(status.daily_realized_pnl),
        ),
        Span::raw(format!(
            " | Trades today: {} | [s]tart [x]stop [q]uit",
            status.trades_today
        )),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(header, chunks[0]);

    let market: Vec<ListItem> = app
        .market
        .iter()
        .map(|s| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<16}", s.symbol),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" ${:.4}", s.price)),
                Span::styled(format!("  24h {:+.2}%", s.change_24h), pnl_style(s.change_24h)),
            ]))
        })
        .collect();
    let market_list = List::new(market).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Market ({} watched)", app.status.watchlist.len())),
    );
    f.render_widget(market_list, chunks[1]);

    let positions: Vec<ListItem> = app
        .positions
        .iter()
        .filter(|p| p.is_open())
        .map(|p| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<16}", p.symbol),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    " {} @ ${:.4} | SL ${:.4} TP ${:.4}",
                    p.quantity, p.entry_price, p.stop_loss, p.take_profit
                )),
                Span::styled(
                    format!("  uPnL {:+.4}", p.unrealized_pnl),
                    pnl_style(p.unrealized_pnl),
                ),
            ]))
        })
        .collect();
    let positions_list = List::new(positions).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Open Positions ({})", app.status.open_positions)),
    );
    f.render_widget(positions_list, chunks[2]);

    let trades: Vec<ListItem> = app
        .trades
        .iter()
        .map(|t| {
            let pnl = t
                .pnl
                .map(|p| format!(" pnl {:+.4}", p))
                .unwrap_or_default();
            let color = match t.action {
                TradeAction::Open => Color::Cyan,
                TradeAction::Close => Color::Magenta,
            };
            ListItem::new(Line::from(Span::styled(
                format!(
                    "{} {:<5} {:<16} {} @ ${:.4} [{}]{}",
                    t.executed_at.format("%H:%M:%S"),
                    t.action.as_str(),
                    t.symbol,
                    t.quantity,
                    t.price,
                    t.strategy,
                    pnl
                ),
                Style::default().fg(color),
            )))
        })
        .collect();
    let trades_list = List::new(trades).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Trades ({})", app.status.total_trades)),
    );
    f.render_widget(trades_list, chunks[3]);
}
