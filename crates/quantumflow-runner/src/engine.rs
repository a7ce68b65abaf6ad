//! The per-tick core loop.
//!
//! One tick: drain ingress (ring first, then socket, under a shared
//! budget) → apply events to books → snapshot the active symbol →
//! evaluate strategies → broadcast telemetry when the interval has
//! elapsed → record latency. The loop runs on a dedicated matching
//! thread that owns every book, history, strategy and converter; nothing
//! here needs a lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use quantumflow_book::{Book, BookSnapshot, DEFAULT_POOL_CAPACITY};
use quantumflow_ingress::{BridgeSocket, RingConsumer, RingStats, SocketStats};
use quantumflow_models::{
    EventKind, LatencySnapshot, MarketDataEvent, PriceConverterRegistry, TradeInfo,
};
use quantumflow_strategy::StrategyEngine;

use crate::latency::{elapsed_us, LatencyMeter};
use crate::telemetry::{self, TelemetrySink};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub symbols: Vec<String>,
    pub headless: bool,
    /// Events consumed per tick across both ingress paths.
    pub drain_budget: usize,
    /// Telemetry cadence (~30 Hz).
    pub broadcast_interval: Duration,
    /// Pause after a tick that drained nothing.
    pub idle_sleep: Duration,
    /// History length that triggers truncation...
    pub history_high_water: usize,
    /// ...down to this many most recent trades.
    pub history_truncate_to: usize,
    /// Trades retained between broadcasts.
    pub broadcast_buffer_cap: usize,
    /// Order-pool slots per book.
    pub pool_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTC-USDT-SWAP".to_string(), "ETH-USDT-SWAP".to_string()],
            headless: false,
            drain_budget: 256,
            broadcast_interval: Duration::from_nanos(33_333_333),
            idle_sleep: Duration::from_micros(100),
            history_high_water: 1000,
            history_truncate_to: 500,
            broadcast_buffer_cap: 200,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    books: HashMap<String, Book>,
    histories: HashMap<String, Vec<TradeInfo>>,
    price_registry: PriceConverterRegistry,
    strategy_engine: StrategyEngine,
    ring: RingConsumer,
    socket: Option<BridgeSocket>,
    sink: Arc<dyn TelemetrySink>,
    latency: LatencyMeter,
    next_order_id: u64,
    /// Last symbol observed in a drain; snapshots follow it.
    active_symbol: String,
    broadcast_buffer: Vec<TradeInfo>,
    last_broadcast: Option<Instant>,
    latest_ingest_us: f64,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        strategy_engine: StrategyEngine,
        ring: RingConsumer,
        socket: Option<BridgeSocket>,
        sink: Arc<dyn TelemetrySink>,
    ) -> Self {
        let mut books = HashMap::new();
        let mut histories = HashMap::new();
        for symbol in &config.symbols {
            books.insert(symbol.clone(), Book::with_pool_capacity(config.pool_capacity));
            histories.insert(symbol.clone(), Vec::new());
        }
        let active_symbol = config.symbols.first().cloned().unwrap_or_default();

        Self {
            config,
            books,
            histories,
            price_registry: PriceConverterRegistry::default(),
            strategy_engine,
            ring,
            socket,
            sink,
            latency: LatencyMeter::new(),
            next_order_id: 1,
            active_symbol,
            broadcast_buffer: Vec::new(),
            last_broadcast: None,
            latest_ingest_us: 0.0,
        }
    }

    /// Run ticks until the shutdown flag is raised.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!("[ENGINE] entering main loop; waiting for market data");
        let mut loop_count: u64 = 0;

        while !shutdown.load(Ordering::Relaxed) {
            let drained = self.tick();
            loop_count += 1;

            if self.config.headless && loop_count % 1000 == 0 {
                let stats = self.ring.stats();
                info!(
                    "[ENGINE] loop {}: ring pushed={} popped={} dropped={} | drained={} | strategies={}",
                    loop_count,
                    stats.push_count,
                    stats.pop_count,
                    stats.drop_count,
                    drained,
                    self.strategy_engine.strategy_count()
                );
            }

            // Pace the loop when producers are quiet.
            if drained == 0 {
                std::thread::sleep(self.config.idle_sleep);
            }
        }

        let stats = self.ring.stats();
        info!(
            "[ENGINE] shutdown: ring pushed={} popped={} dropped={}",
            stats.push_count, stats.pop_count, stats.drop_count
        );
    }

    /// One pipeline iteration. Returns the number of events drained.
    pub fn tick(&mut self) -> usize {
        let t0 = Instant::now();

        // Ring drains ahead of the socket; both share the budget.
        let mut drained = 0;
        while drained < self.config.drain_budget {
            let Some(event) = self.ring.pop() else { break };
            self.apply_event(&event);
            drained += 1;
        }
        let mut socket = self.socket.take();
        if let Some(sock) = socket.as_mut() {
            while drained < self.config.drain_budget {
                let Some(event) = sock.recv() else { break };
                self.apply_event(&event);
                drained += 1;
            }
        }
        self.socket = socket;

        let t1 = Instant::now();

        // Snapshot the active book and bound its trade history.
        let symbol = self.active_symbol.clone();
        let mut snapshot = match self.books.get(&symbol) {
            Some(book) => BookSnapshot::from_book(book, &symbol, self.price_registry.get(&symbol)),
            None => BookSnapshot {
                symbol: symbol.clone(),
                ..Default::default()
            },
        };
        snapshot.timestamp_ns = wall_clock_ns();

        if let Some(history) = self.histories.get_mut(&symbol) {
            if history.len() > self.config.history_high_water {
                let excess = history.len() - self.config.history_truncate_to;
                history.drain(..excess);
            }
        }

        let history: &[TradeInfo] = self
            .histories
            .get(&symbol)
            .map(|h| h.as_slice())
            .unwrap_or(&[]);
        self.strategy_engine.evaluate(&snapshot, history);

        let t2 = Instant::now();

        let mut t3 = t2;
        let mut broadcast_us = 0.0;
        let due = self
            .last_broadcast
            .map_or(true, |at| at.elapsed() >= self.config.broadcast_interval);
        if due {
            let frame_ns = wall_clock_ns();
            if !snapshot.symbol.is_empty() {
                self.sink
                    .publish(telemetry::book_frame(&snapshot, frame_ns));
            }
            self.sink.publish(telemetry::trades_frame(
                &snapshot.symbol,
                &self.broadcast_buffer,
                frame_ns,
            ));
            self.sink.publish(telemetry::strategies_frame(
                self.strategy_engine.all_signals(),
                frame_ns,
            ));

            t3 = Instant::now();
            broadcast_us = elapsed_us(t2, t3);
            self.sink.publish(telemetry::latency_frame(
                &LatencySnapshot {
                    ingest_us: self.latest_ingest_us,
                    match_us: elapsed_us(t0, t1),
                    strategy_us: elapsed_us(t1, t2),
                    broadcast_us,
                    total_us: elapsed_us(t0, t3),
                },
                frame_ns,
            ));

            if self.broadcast_buffer.len() > self.config.broadcast_buffer_cap {
                let excess = self.broadcast_buffer.len() - self.config.broadcast_buffer_cap;
                self.broadcast_buffer.drain(..excess);
            }
            self.last_broadcast = Some(t3);
        }

        self.latency.record(LatencySnapshot {
            ingest_us: self.latest_ingest_us,
            match_us: elapsed_us(t0, t1),
            strategy_us: elapsed_us(t1, t2),
            broadcast_us,
            total_us: elapsed_us(t0, t3),
        });

        drained
    }

    fn apply_event(&mut self, event: &MarketDataEvent) {
        let symbol = event.symbol().to_string();
        if symbol.is_empty() {
            return;
        }

        if !self.books.contains_key(&symbol) {
            debug!("[ENGINE] creating book for new symbol {}", symbol);
            self.books.insert(
                symbol.clone(),
                Book::with_pool_capacity(self.config.pool_capacity),
            );
            self.histories.insert(symbol.clone(), Vec::new());
        }
        self.active_symbol = symbol.clone();

        let now_ns = wall_clock_ns();
        if event.timestamp_ns <= now_ns {
            self.latest_ingest_us = (now_ns - event.timestamp_ns) as f64 / 1000.0;
        }

        match event.kind {
            EventKind::BookLevel => {
                let converter = *self.price_registry.get(&symbol);
                let order_id = self.next_order_id;
                self.next_order_id += 1;

                let trades = match self.books.get_mut(&symbol) {
                    Some(book) => book.place_order(
                        order_id,
                        0,
                        event.side,
                        converter.to_internal(event.price),
                        event.quantity,
                    ),
                    None => Vec::new(),
                };

                for trade in trades {
                    let info = TradeInfo {
                        price: converter.to_external(trade.price),
                        quantity: trade.volume,
                        side: event.side,
                        timestamp_ns: event.timestamp_ns,
                    };
                    self.record_trade(&symbol, info);
                }
            }
            EventKind::Trade => {
                let info = TradeInfo {
                    price: event.price,
                    quantity: event.quantity,
                    side: event.side,
                    timestamp_ns: event.timestamp_ns,
                };
                self.record_trade(&symbol, info);
            }
        }
    }

    fn record_trade(&mut self, symbol: &str, trade: TradeInfo) {
        if let Some(history) = self.histories.get_mut(symbol) {
            history.push(trade);
        }
        self.strategy_engine.on_trade(&trade);
        self.broadcast_buffer.push(trade);
    }

    pub fn book(&self, symbol: &str) -> Option<&Book> {
        self.books.get(symbol)
    }

    pub fn history(&self, symbol: &str) -> Option<&[TradeInfo]> {
        self.histories.get(symbol).map(|h| h.as_slice())
    }

    pub fn strategies(&mut self) -> &mut StrategyEngine {
        &mut self.strategy_engine
    }

    pub fn latency(&self) -> LatencySnapshot {
        self.latency.snapshot()
    }

    pub fn ring_stats(&self) -> RingStats {
        self.ring.stats()
    }

    pub fn socket_stats(&self) -> Option<SocketStats> {
        self.socket.as_ref().map(|s| s.stats())
    }

    pub fn price_registry_mut(&mut self) -> &mut PriceConverterRegistry {
        &mut self.price_registry
    }
}

fn wall_clock_ns() -> u64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::NullSink;
    use quantumflow_ingress::{EventRing, RingProducer};
    use quantumflow_models::Side;

    fn test_engine(budget: usize) -> (Engine, RingProducer) {
        let (producer, consumer) = EventRing::with_capacity(8192);
        let config = EngineConfig {
            symbols: vec!["BTC-USDT-SWAP".to_string()],
            headless: true,
            drain_budget: budget,
            broadcast_interval: Duration::from_secs(3600),
            ..Default::default()
        };
        let engine = Engine::new(
            config,
            StrategyEngine::with_builtins(),
            consumer,
            None,
            Arc::new(NullSink),
        );
        (engine, producer)
    }

    fn level_event(symbol: &str, side: Side, price: f64, quantity: u64) -> MarketDataEvent {
        MarketDataEvent::new(symbol, side, EventKind::BookLevel, price, quantity, 1, 0)
    }

    #[test]
    fn test_tick_applies_ring_events_to_book() {
        let (mut engine, producer) = test_engine(256);
        producer.push(level_event("BTC-USDT-SWAP", Side::Buy, 100.0, 10));
        producer.push(level_event("BTC-USDT-SWAP", Side::Sell, 101.0, 20));

        let drained = engine.tick();
        assert_eq!(drained, 2);

        let book = engine.book("BTC-USDT-SWAP").unwrap();
        assert_eq!(book.best_bid(), 10000);
        assert_eq!(book.best_ask(), 10100);
    }

    #[test]
    fn test_crossing_events_generate_history() {
        let (mut engine, producer) = test_engine(256);
        producer.push(level_event("BTC-USDT-SWAP", Side::Sell, 100.0, 30));
        producer.push(level_event("BTC-USDT-SWAP", Side::Buy, 100.0, 50));

        engine.tick();

        let history = engine.history("BTC-USDT-SWAP").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity, 30);
        assert_eq!(history[0].price, 100.0);
    }

    #[test]
    fn test_drain_budget_bounds_tick_work() {
        let (mut engine, producer) = test_engine(16);
        for i in 0..40 {
            producer.push(level_event("BTC-USDT-SWAP", Side::Buy, 90.0 + i as f64, 1));
        }

        assert_eq!(engine.tick(), 16);
        assert_eq!(engine.tick(), 16);
        assert_eq!(engine.tick(), 8);
        assert_eq!(engine.tick(), 0);
    }

    #[test]
    fn test_unknown_symbol_creates_book_lazily() {
        let (mut engine, producer) = test_engine(256);
        producer.push(level_event("SOL-USDT-SWAP", Side::Buy, 50.0, 5));

        engine.tick();

        assert!(engine.book("SOL-USDT-SWAP").is_some());
        assert_eq!(engine.book("SOL-USDT-SWAP").unwrap().best_bid(), 5000);
    }

    #[test]
    fn test_trade_events_feed_history_without_book_changes() {
        let (mut engine, producer) = test_engine(256);
        producer.push(MarketDataEvent::new(
            "BTC-USDT-SWAP",
            Side::Sell,
            EventKind::Trade,
            99.5,
            7,
            1,
            0,
        ));

        engine.tick();

        let history = engine.history("BTC-USDT-SWAP").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].price, 99.5);
        assert_eq!(engine.book("BTC-USDT-SWAP").unwrap().resting_order_count(), 0);
    }

    #[test]
    fn test_history_truncates_to_recent_half() {
        let (mut engine, producer) = test_engine(2048);
        let config_cap = 1001;
        for i in 0..config_cap {
            producer.push(MarketDataEvent::new(
                "BTC-USDT-SWAP",
                Side::Buy,
                EventKind::Trade,
                100.0,
                i as u64 + 1,
                i as u64,
                0,
            ));
        }

        engine.tick();

        let history = engine.history("BTC-USDT-SWAP").unwrap();
        assert_eq!(history.len(), 500);
        // The most recent trades survive.
        assert_eq!(history.last().unwrap().quantity, config_cap as u64);
    }

    #[test]
    fn test_latency_snapshot_populated_after_tick() {
        let (mut engine, producer) = test_engine(256);
        producer.push(level_event("BTC-USDT-SWAP", Side::Buy, 100.0, 10));

        engine.tick();

        let latency = engine.latency();
        assert!(latency.total_us >= latency.match_us);
        assert!(latency.match_us >= 0.0);
        assert!(latency.ingest_us >= 0.0);
    }

    #[test]
    fn test_invalid_events_are_ignored() {
        let (mut engine, producer) = test_engine(256);
        // Zero price and zero volume are rejected by the book.
        producer.push(level_event("BTC-USDT-SWAP", Side::Buy, 0.0, 10));
        producer.push(level_event("BTC-USDT-SWAP", Side::Buy, 100.0, 0));

        engine.tick();

        let book = engine.book("BTC-USDT-SWAP").unwrap();
        assert_eq!(book.bid_level_count(), 0);
        assert_eq!(book.resting_order_count(), 0);
    }
}
