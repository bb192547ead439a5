use plotland::Position;

use crate::store::StoreError;

/// Error type for one player action.
///
/// Every variant's `Display` is the user-visible message; store
/// faults collapse into a generic retryable one.
#[derive(Debug)]
pub enum ActionError {
    /// The action requires an active player record.
    NotInGame,
    CellNotFound {
        position: Position,
    },
    /// The cell has no purchase price, so it can never change hands.
    NotPurchasable {
        position: Position,
    },
    AlreadyOwned {
        position: Position,
    },
    OwnedByOther {
        position: Position,
        owner: String,
    },
    InsufficientFunds {
        required: i64,
        wallet: i64,
    },
    /// The atomic bank update was rejected. Nothing was changed.
    BankTransactionFailed,
    Store(StoreError),
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActionError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::NotInGame => {
                write!(f, "You are not in the game yet. Send the start command to join.")
            }
            ActionError::CellNotFound { position } => {
                write!(f, "No information about cell {} was found. Nothing happened.", position)
            }
            ActionError::NotPurchasable { position } => {
                write!(f, "Cell {} is not for sale.", position)
            }
            ActionError::AlreadyOwned { position } => {
                write!(f, "You already own cell {}.", position)
            }
            ActionError::OwnedByOther { position, owner } => {
                write!(f, "Cell {} already belongs to {}.", position, owner)
            }
            ActionError::InsufficientFunds { required, wallet } => write!(
                f,
                "Not enough coins: this costs {} and you have {}.",
                required, wallet
            ),
            ActionError::BankTransactionFailed => {
                write!(f, "The bank could not process the transaction. Please try again.")
            }
            ActionError::Store(_) => {
                write!(f, "Something went wrong while processing your move. Please try again.")
            }
        }
    }
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        ActionError::Store(err)
    }
}
