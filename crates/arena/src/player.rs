use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::MoveResponse;

/// Something the match runner can seat at the board.
///
/// [`EngineClient`](crate::EngineClient) is the real implementation; the
/// trait is the seam that lets the runner be driven by in-process players.
#[async_trait]
pub trait Player: Send {
    /// Fixed identity, `name:depth`.
    fn label(&self) -> String;

    /// Name the player currently goes by; an engine may rename itself.
    fn name(&self) -> &str;

    async fn connect(&mut self) -> Result<()>;

    /// Start a new game described by a GGF record.
    async fn set_game(&mut self, ggf: &str) -> Result<()>;

    /// Compute and return this player's next move.
    async fn go(&mut self) -> Result<MoveResponse>;

    /// Tell the player about a move just made, by either side.
    async fn announce_move(&mut self, response: &MoveResponse) -> Result<()>;

    async fn disconnect(&mut self) -> Result<()>;
}
