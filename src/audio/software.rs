//! In-process audio graph: sine oscillators, gains, and analysers.
//!
//! The graph lives behind `Arc<Mutex<_>>` so an output callback (see
//! [`super::output`]) can render it on the device thread while control calls
//! arrive from the UI thread. Offline hosts call [`SoftwareBackend::render`]
//! directly.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::sync::{Arc, Mutex, MutexGuard};

use super::backend::{AudioBackend, AudioParam, ContextState, NodeId};
use super::fft::{sample_to_byte, Spectrum};
use crate::error::AudioError;

/// Safety limiter: hard clip applied to the destination output
pub const OUTPUT_LIMIT: f32 = 0.5;

// Deepest node chain the renderer will follow
const MAX_GRAPH_DEPTH: usize = 64;

/// Device stream that the backend starts on resume
pub trait OutputStream {
    fn start(&mut self) -> Result<(), AudioError>;
}

/// Automatable value with pending `set_value_at_time` events
#[derive(Debug)]
struct Param {
    value: f32,
    events: VecDeque<(f64, f32)>,
}

impl Param {
    fn new(value: f32) -> Self {
        Self {
            value,
            events: VecDeque::new(),
        }
    }

    fn schedule(&mut self, time: f64, value: f32) {
        let at = self.events.partition_point(|(t, _)| *t <= time);
        self.events.insert(at, (time, value));
    }

    fn advance(&mut self, now: f64) {
        while let Some(&(time, value)) = self.events.front() {
            if time > now {
                break;
            }
            self.value = value;
            self.events.pop_front();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Playback {
    Idle,
    Running,
    Stopped,
}

enum NodeKind {
    Oscillator {
        frequency: Param,
        phase: f32,
        playback: Playback,
    },
    Gain {
        gain: Param,
    },
    Analyser {
        history: Vec<f32>,
        write: usize,
        spectrum: Spectrum,
    },
    Destination,
}

impl NodeKind {
    fn label(&self) -> &'static str {
        match self {
            NodeKind::Oscillator { .. } => "oscillator",
            NodeKind::Gain { .. } => "gain",
            NodeKind::Analyser { .. } => "analyser",
            NodeKind::Destination => "destination",
        }
    }
}

struct Node {
    kind: NodeKind,
    outputs: Vec<usize>,
}

struct Graph {
    nodes: Vec<Option<Node>>,
    sample_rate: f32,
    frames_rendered: u64,
    running: bool,
    destination: usize,
}

impl Graph {
    fn new(sample_rate: f32) -> Self {
        Self {
            nodes: vec![Some(Node {
                kind: NodeKind::Destination,
                outputs: Vec::new(),
            })],
            sample_rate,
            frames_rendered: 0,
            running: false,
            destination: 0,
        }
    }

    fn now(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate as f64
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            outputs: Vec::new(),
        };
        // Reuse released slots so toggling harmonics does not grow the graph
        let index = match self.nodes.iter().position(Option::is_none) {
            Some(free) => {
                self.nodes[free] = Some(node);
                free
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        NodeId(index as u32)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, AudioError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(AudioError::UnknownNode(id))
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn render(&mut self, out: &mut [f32]) {
        if !self.running {
            // A suspended context is silent and its clock does not advance
            out.fill(0.0);
            return;
        }

        let count = self.nodes.len();
        let mut inputs: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (from, node) in self.nodes.iter().enumerate() {
            if let Some(node) = node {
                for &to in &node.outputs {
                    if to < count {
                        inputs[to].push(from);
                    }
                }
            }
        }

        let mut memo: Vec<Option<f32>> = vec![None; count];
        for sample in out.iter_mut() {
            let now = self.now();
            for node in self.nodes.iter_mut().flatten() {
                match &mut node.kind {
                    NodeKind::Oscillator { frequency, .. } => frequency.advance(now),
                    NodeKind::Gain { gain } => gain.advance(now),
                    _ => {}
                }
            }

            memo.fill(None);
            let value = self.eval(self.destination, &inputs, &mut memo, 0);
            *sample = value.clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT);
            self.frames_rendered += 1;
        }
    }

    fn eval(
        &mut self,
        id: usize,
        inputs: &[Vec<usize>],
        memo: &mut [Option<f32>],
        depth: usize,
    ) -> f32 {
        if let Some(value) = memo[id] {
            return value;
        }
        if depth > MAX_GRAPH_DEPTH {
            return 0.0;
        }
        // Provisional value breaks feedback cycles
        memo[id] = Some(0.0);

        let mut sum = 0.0;
        for &input in &inputs[id] {
            sum += self.eval(input, inputs, memo, depth + 1);
        }

        let sample_rate = self.sample_rate;
        let value = match self.nodes[id].as_mut().map(|n| &mut n.kind) {
            Some(NodeKind::Oscillator {
                frequency,
                phase,
                playback,
            }) => {
                if *playback == Playback::Running {
                    let v = phase.sin();
                    *phase = (*phase + TAU * frequency.value / sample_rate) % TAU;
                    v
                } else {
                    0.0
                }
            }
            Some(NodeKind::Gain { gain }) => sum * gain.value,
            Some(NodeKind::Analyser { history, write, .. }) => {
                history[*write] = sum;
                *write = (*write + 1) % history.len();
                sum
            }
            Some(NodeKind::Destination) => sum,
            None => 0.0,
        };

        memo[id] = Some(value);
        value
    }
}

/// Handle for rendering the shared graph from a device callback
#[derive(Clone)]
pub struct GraphRenderer {
    graph: Arc<Mutex<Graph>>,
}

impl GraphRenderer {
    /// Render mono samples into `out`
    pub fn render(&self, out: &mut [f32]) {
        lock(&self.graph).render(out);
    }
}

/// Software implementation of [`AudioBackend`]
pub struct SoftwareBackend {
    graph: Arc<Mutex<Graph>>,
    sample_rate: f32,
    state: ContextState,
    output: Option<Box<dyn OutputStream>>,
}

impl SoftwareBackend {
    /// Backend with no device attached; audio is produced by calling [`Self::render`]
    pub fn offline(sample_rate: f32) -> Self {
        Self {
            graph: Arc::new(Mutex::new(Graph::new(sample_rate))),
            sample_rate,
            state: ContextState::Suspended,
            output: None,
        }
    }

    /// Attach a device stream that is started on resume
    pub fn with_output(mut self, output: Box<dyn OutputStream>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn renderer(&self) -> GraphRenderer {
        GraphRenderer {
            graph: Arc::clone(&self.graph),
        }
    }

    /// Render mono samples (silence while suspended)
    pub fn render(&self, out: &mut [f32]) {
        lock(&self.graph).render(out);
    }

    /// Oscillators currently started and not yet stopped
    pub fn live_oscillators(&self) -> usize {
        lock(&self.graph)
            .nodes
            .iter()
            .flatten()
            .filter(|n| {
                matches!(
                    n.kind,
                    NodeKind::Oscillator {
                        playback: Playback::Running,
                        ..
                    }
                )
            })
            .count()
    }

    /// Allocated nodes, destination included
    pub fn node_count(&self) -> usize {
        lock(&self.graph).nodes.iter().flatten().count()
    }

    /// Put the context back to sleep; the device keeps running but renders silence
    pub fn suspend(&mut self) {
        lock(&self.graph).running = false;
        if self.state == ContextState::Running {
            self.state = ContextState::Suspended;
        }
    }

    /// Permanently shut the context down
    pub fn close(&mut self) {
        lock(&self.graph).running = false;
        self.state = ContextState::Closed;
    }
}

fn lock(graph: &Mutex<Graph>) -> MutexGuard<'_, Graph> {
    graph.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AudioBackend for SoftwareBackend {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn current_time(&self) -> f64 {
        lock(&self.graph).now()
    }

    fn state(&self) -> ContextState {
        self.state
    }

    async fn resume(&mut self) -> Result<(), AudioError> {
        match self.state {
            ContextState::Running => return Ok(()),
            ContextState::Closed => {
                return Err(AudioError::ResumeRejected("context is closed".to_string()))
            }
            ContextState::Suspended => {}
        }

        if let Some(output) = self.output.as_mut() {
            output.start()?;
        }
        lock(&self.graph).running = true;
        self.state = ContextState::Running;
        log::debug!("Software context running @ {}Hz", self.sample_rate);
        Ok(())
    }

    fn destination(&self) -> NodeId {
        NodeId(lock(&self.graph).destination as u32)
    }

    fn create_oscillator(&mut self, frequency_hz: f32) -> Result<NodeId, AudioError> {
        if !frequency_hz.is_finite() {
            return Err(AudioError::NodeCreation {
                kind: "oscillator",
                reason: format!("non-finite frequency {}", frequency_hz),
            });
        }
        Ok(lock(&self.graph).insert(NodeKind::Oscillator {
            frequency: Param::new(frequency_hz),
            phase: 0.0,
            playback: Playback::Idle,
        }))
    }

    fn create_gain(&mut self, gain: f32) -> Result<NodeId, AudioError> {
        Ok(lock(&self.graph).insert(NodeKind::Gain {
            gain: Param::new(gain),
        }))
    }

    fn create_analyser(&mut self, fft_size: usize) -> Result<NodeId, AudioError> {
        if !fft_size.is_power_of_two() || fft_size < 32 {
            return Err(AudioError::NodeCreation {
                kind: "analyser",
                reason: format!("fft size {} is not a power of 2 >= 32", fft_size),
            });
        }
        Ok(lock(&self.graph).insert(NodeKind::Analyser {
            history: vec![0.0; fft_size],
            write: 0,
            spectrum: Spectrum::new(fft_size),
        }))
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), AudioError> {
        let mut graph = lock(&self.graph);
        if graph.node(to).is_none() {
            return Err(AudioError::UnknownNode(to));
        }
        let node = graph.node_mut(from)?;
        if matches!(node.kind, NodeKind::Destination) {
            return Err(AudioError::InvalidState {
                node: from,
                reason: "destination has no outputs",
            });
        }
        let target = to.0 as usize;
        if !node.outputs.contains(&target) {
            node.outputs.push(target);
        }
        Ok(())
    }

    fn disconnect(&mut self, node: NodeId) {
        if let Ok(node) = lock(&self.graph).node_mut(node) {
            node.outputs.clear();
        }
    }

    fn start(&mut self, oscillator: NodeId) -> Result<(), AudioError> {
        let mut graph = lock(&self.graph);
        match &mut graph.node_mut(oscillator)?.kind {
            NodeKind::Oscillator { playback, .. } => match playback {
                Playback::Idle => {
                    *playback = Playback::Running;
                    Ok(())
                }
                _ => Err(AudioError::InvalidState {
                    node: oscillator,
                    reason: "oscillator already started",
                }),
            },
            _ => Err(AudioError::InvalidState {
                node: oscillator,
                reason: "not an oscillator",
            }),
        }
    }

    fn stop(&mut self, oscillator: NodeId) -> Result<(), AudioError> {
        let mut graph = lock(&self.graph);
        match &mut graph.node_mut(oscillator)?.kind {
            NodeKind::Oscillator { playback, .. } => match playback {
                Playback::Running => {
                    *playback = Playback::Stopped;
                    Ok(())
                }
                Playback::Idle => Err(AudioError::InvalidState {
                    node: oscillator,
                    reason: "oscillator never started",
                }),
                Playback::Stopped => Err(AudioError::InvalidState {
                    node: oscillator,
                    reason: "oscillator already stopped",
                }),
            },
            _ => Err(AudioError::InvalidState {
                node: oscillator,
                reason: "not an oscillator",
            }),
        }
    }

    fn set_value_at_time(
        &mut self,
        node: NodeId,
        param: AudioParam,
        value: f32,
        time: f64,
    ) -> Result<(), AudioError> {
        let mut graph = lock(&self.graph);
        let target = graph.node_mut(node)?;
        match (&mut target.kind, param) {
            (NodeKind::Oscillator { frequency, .. }, AudioParam::Frequency) => {
                frequency.schedule(time, value);
                Ok(())
            }
            (NodeKind::Gain { gain }, AudioParam::Gain) => {
                gain.schedule(time, value);
                Ok(())
            }
            (kind, _) => {
                log::warn!("{:?} has no {:?} parameter ({})", node, param, kind.label());
                Err(AudioError::InvalidState {
                    node,
                    reason: "parameter not supported by node",
                })
            }
        }
    }

    fn fft_size(&self, analyser: NodeId) -> usize {
        match lock(&self.graph).node(analyser).map(|n| &n.kind) {
            Some(NodeKind::Analyser { spectrum, .. }) => spectrum.fft_size(),
            _ => 0,
        }
    }

    fn byte_frequency_data(&self, analyser: NodeId, out: &mut [u8]) {
        let mut graph = lock(&self.graph);
        match graph.node_mut(analyser).map(|n| &mut n.kind) {
            Ok(NodeKind::Analyser {
                history,
                write,
                spectrum,
            }) => {
                let ordered: Vec<f32> = history[*write..]
                    .iter()
                    .chain(&history[..*write])
                    .copied()
                    .collect();
                spectrum.process(&ordered);
                spectrum.byte_magnitudes(out);
            }
            _ => out.fill(0),
        }
    }

    fn byte_time_domain_data(&self, analyser: NodeId, out: &mut [u8]) {
        let graph = lock(&self.graph);
        match graph.node(analyser).map(|n| &n.kind) {
            Some(NodeKind::Analyser { history, write, .. }) => {
                let ordered = history[*write..].iter().chain(&history[..*write]);
                for (byte, &sample) in out.iter_mut().zip(ordered) {
                    *byte = sample_to_byte(sample);
                }
            }
            _ => out.fill(128),
        }
    }

    fn release(&mut self, node: NodeId) {
        let mut graph = lock(&self.graph);
        let index = node.0 as usize;
        if index == graph.destination || index >= graph.nodes.len() {
            return;
        }
        graph.nodes[index] = None;
        for other in graph.nodes.iter_mut().flatten() {
            other.outputs.retain(|&to| to != index);
        }
    }
}
