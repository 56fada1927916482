use std::collections::VecDeque;

use tessera_runtime::Command;

pub struct CommandEnvelope {
    pub id: u64,
    pub cmd: Command,
}

/// FIFO of controller commands, each tagged with a monotonically increasing id.
pub struct CommandQueue {
    queue: VecDeque<CommandEnvelope>,
    next_id: u64,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            next_id: 1,
        }
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn push(&mut self, cmd: Command) -> u64 {
        let id = self.alloc_id();
        self.queue.push_back(CommandEnvelope { id, cmd });
        id
    }

    pub fn pop(&mut self) -> Option<CommandEnvelope> {
        self.queue.pop_front()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

pub fn log_command(env: &CommandEnvelope) {
    match &env.cmd {
        Command::GenerateTerrain {
            map_size,
            max_height,
            roughness,
            max_depth,
        } => log::info!(
            target: "commands",
            "[#{}] GenerateTerrain size={} max_height={} roughness={:.3} max_depth={}",
            env.id,
            map_size,
            max_height,
            roughness,
            max_depth
        ),
        Command::PlaceModel { rect, model_id } => log::info!(
            target: "commands",
            "[#{}] PlaceModel rect=({},{} {}x{}) model={}",
            env.id,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            model_id
        ),
        Command::RemoveModel { rect } => log::info!(
            target: "commands",
            "[#{}] RemoveModel rect=({},{} {}x{})",
            env.id,
            rect.x,
            rect.y,
            rect.w,
            rect.h
        ),
        Command::PlaceModelRandom { model_id, percent } => log::info!(
            target: "commands",
            "[#{}] PlaceModelRandom model={} percent={:.1}",
            env.id,
            model_id,
            percent
        ),
    }
}
