//! Error types for text input at the board API edge.

use std::fmt;

use super::types::Color;

/// Reasons `Position::set` rejects a FEN string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// Fewer than the four mandatory fields
    TooFewParts { found: usize },
    InvalidPiece { char: char },
    InvalidCastling { char: char },
    InvalidSideToMove { found: String },
    /// En passant field that is neither `-` nor a square
    InvalidEnPassant { found: String },
    /// Placement field without exactly eight ranks
    InvalidRank { rank: usize },
    TooManyFiles { rank: usize, files: usize },
    /// Halfmove clock or fullmove number is not a number
    InvalidCounter { found: String },
    KingCount { color: Color, found: u32 },
    /// The side not to move has its king attacked
    OpponentInCheck { color: Color },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "fen has {found} fields, at least 4 are required")
            }
            FenError::InvalidPiece { char } => write!(f, "unknown piece '{char}' in placement"),
            FenError::InvalidCastling { char } => write!(f, "bad castling flag '{char}'"),
            FenError::InvalidSideToMove { found } => {
                write!(f, "side to move is '{found}', not 'w' or 'b'")
            }
            FenError::InvalidEnPassant { found } => write!(f, "bad en passant field '{found}'"),
            FenError::InvalidRank { rank } => write!(f, "placement has {rank} ranks, not 8"),
            FenError::TooManyFiles { rank, files } => {
                write!(f, "rank {rank} of the placement spans {files} files")
            }
            FenError::InvalidCounter { found } => write!(f, "bad move counter '{found}'"),
            FenError::KingCount { color, found } => {
                write!(f, "{color} has {found} kings, exactly one is required")
            }
            FenError::OpponentInCheck { color } => {
                write!(f, "{color} is in check but not to move")
            }
        }
    }
}

impl std::error::Error for FenError {}

/// Reasons `Position::parse_move` rejects move text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Not 4 or 5 characters long
    InvalidLength { len: usize },
    InvalidSquare { notation: String },
    /// Promotion letter other than `n`, `b`, `r` or `q`
    InvalidPromotion { char: char },
    /// Well formed, but no legal move in the position matches
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "move text has {len} characters, expected 4 or 5")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "move '{notation}' names a square off the board")
            }
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "cannot promote to '{char}'")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "'{notation}' is not legal here")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    RankOutOfBounds { rank: u8 },
    FileOutOfBounds { file: u8 },
    /// Not a file letter followed by a rank digit
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::RankOutOfBounds { rank } => write!(f, "rank index {rank} is past 7"),
            SquareError::FileOutOfBounds { file } => write!(f, "file index {file} is past 7"),
            SquareError::InvalidNotation { notation } => write!(f, "'{notation}' is not a square"),
        }
    }
}

impl std::error::Error for SquareError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_error_messages_carry_context() {
        let text = FenError::TooFewParts { found: 2 }.to_string();
        assert!(text.contains('2') && text.contains('4'));

        assert!(FenError::InvalidPiece { char: 'z' }.to_string().contains("'z'"));

        let text = FenError::KingCount {
            color: Color::Black,
            found: 0,
        }
        .to_string();
        assert!(text.contains("Black") && text.contains('0'));
    }

    #[test]
    fn test_move_error_messages_carry_context() {
        assert!(MoveParseError::InvalidLength { len: 3 }.to_string().contains('3'));
        let err = MoveParseError::IllegalMove {
            notation: "e2e5".to_string(),
        };
        assert!(err.to_string().contains("e2e5"));
    }

    #[test]
    fn test_errors_are_std_errors() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(FenError::InvalidRank { rank: 7 }),
            Box::new(MoveParseError::InvalidPromotion { char: 'k' }),
            Box::new(SquareError::InvalidNotation {
                notation: "xyz".to_string(),
            }),
        ];
        assert!(errors.iter().all(|e| !e.to_string().is_empty()));
    }
}
