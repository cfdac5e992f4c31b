//! Edge signatures and the compatibility test between two tile edges.
//!
//! A socket is read start -> middle -> end along its edge. Two tiles fit
//! together when the shared edge reads identically from both sides, which
//! means one side's socket is the reverse of the other's.

use serde::Deserialize;
use std::fmt;

use crate::catalog::TileVariant;

/// One of the four edges of a square tile.
///
/// The discriminant doubles as the index into a tile's socket array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
}

impl Edge {
    /// Edges in the order neighbors are checked during propagation.
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    /// Index of this edge in a socket array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The edge rotated 180 degrees, `(e + 2) mod 4`.
    pub fn opposite(self) -> Edge {
        Edge::ALL[(self.index() + 2) % 4]
    }

    /// Offset `(dx, dy)` to the neighbor across this edge. `y` grows downward.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Edge::Top => (0, -1),
            Edge::Right => (1, 0),
            Edge::Bottom => (0, 1),
            Edge::Left => (-1, 0),
        }
    }
}

/// A single symbolic token inside a socket.
///
/// Catalog files may use numbers or strings. A number never equals a string,
/// even when they print the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum SocketToken {
    Number(i64),
    Symbol(String),
}

impl fmt::Display for SocketToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketToken::Number(n) => write!(f, "{}", n),
            SocketToken::Symbol(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for SocketToken {
    fn from(n: i64) -> Self {
        SocketToken::Number(n)
    }
}

impl From<i32> for SocketToken {
    fn from(n: i32) -> Self {
        SocketToken::Number(n as i64)
    }
}

impl From<String> for SocketToken {
    fn from(s: String) -> Self {
        SocketToken::Symbol(s)
    }
}

impl From<&str> for SocketToken {
    fn from(s: &str) -> Self {
        SocketToken::Symbol(s.to_string())
    }
}

/// Connection pattern of one edge: `(start, middle, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Socket(pub SocketToken, pub SocketToken, pub SocketToken);

impl Socket {
    pub fn new(
        start: impl Into<SocketToken>,
        middle: impl Into<SocketToken>,
        end: impl Into<SocketToken>,
    ) -> Self {
        Socket(start.into(), middle.into(), end.into())
    }

    /// Whether `other` is this socket read backwards.
    pub fn mates_with(&self, other: &Socket) -> bool {
        self.0 == other.2 && self.1 == other.1 && self.2 == other.0
    }
}

impl fmt::Display for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Whether `a`'s `edge_a` can sit against `b`.
///
/// `b` is always read on the edge opposite `edge_a`; `edge_b` is only checked
/// in debug builds.
pub fn connects(a: &TileVariant, edge_a: Edge, b: &TileVariant, edge_b: Edge) -> bool {
    debug_assert_eq!(edge_b, edge_a.opposite());
    a.socket(edge_a).mates_with(b.socket(edge_a.opposite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: &str, sockets: [Socket; 4]) -> TileVariant {
        TileVariant::plain(id, sockets)
    }

    fn uniform(s: Socket) -> [Socket; 4] {
        [s.clone(), s.clone(), s.clone(), s]
    }

    #[test]
    fn test_edge_opposite() {
        assert_eq!(Edge::Top.opposite(), Edge::Bottom);
        assert_eq!(Edge::Right.opposite(), Edge::Left);
        assert_eq!(Edge::Bottom.opposite(), Edge::Top);
        assert_eq!(Edge::Left.opposite(), Edge::Right);
        for edge in Edge::ALL {
            assert_eq!(edge.opposite().opposite(), edge);
        }
    }

    #[test]
    fn test_reversed_socket_matches() {
        let a = tile(
            "a",
            [
                Socket::new(0, 0, 0),
                Socket::new(1, 2, 3),
                Socket::new(0, 0, 0),
                Socket::new(0, 0, 0),
            ],
        );
        let b = tile(
            "b",
            [
                Socket::new(0, 0, 0),
                Socket::new(0, 0, 0),
                Socket::new(0, 0, 0),
                Socket::new(3, 2, 1),
            ],
        );

        assert!(connects(&a, Edge::Right, &b, Edge::Left));
        // Same order on both sides is not a match
        let c = tile(
            "c",
            [
                Socket::new(0, 0, 0),
                Socket::new(0, 0, 0),
                Socket::new(0, 0, 0),
                Socket::new(1, 2, 3),
            ],
        );
        assert!(!connects(&a, Edge::Right, &c, Edge::Left));
    }

    #[test]
    fn test_number_never_equals_symbol() {
        let a = tile("a", uniform(Socket::new(1, 1, 1)));
        let b = tile("b", uniform(Socket::new("1", "1", "1")));
        assert!(!connects(&a, Edge::Top, &b, Edge::Bottom));
        assert!(connects(&b, Edge::Top, &b, Edge::Bottom));
    }

    #[test]
    fn test_connects_is_symmetric() {
        let tiles = vec![
            tile("a", uniform(Socket::new(0, 1, 0))),
            tile(
                "b",
                [
                    Socket::new(0, 1, 2),
                    Socket::new("x", "y", "z"),
                    Socket::new(2, 1, 0),
                    Socket::new("z", "y", "x"),
                ],
            ),
            tile(
                "c",
                [
                    Socket::new(2, 1, 0),
                    Socket::new(0, 1, 0),
                    Socket::new(0, 1, 2),
                    Socket::new(0, 1, 0),
                ],
            ),
        ];

        for a in &tiles {
            for b in &tiles {
                for edge in Edge::ALL {
                    assert_eq!(
                        connects(a, edge, b, edge.opposite()),
                        connects(b, edge.opposite(), a, edge),
                        "asymmetric for {} {:?} {}",
                        a.id(),
                        edge,
                        b.id()
                    );
                }
            }
        }
    }

    #[test]
    fn test_socket_deserializes_mixed_tokens() {
        let socket: Socket = serde_json::from_str(r#"[0, "grass", 2]"#).unwrap();
        assert_eq!(socket, Socket::new(0, "grass", 2));
    }
}
