use quoridor_core::Player;

pub const WIN_SCORE: i32 = 30_000;

/// Scores within 1000 of `WIN_SCORE` come from a reached goal row.
pub fn is_win_score(score: i32) -> bool {
    score.abs() >= WIN_SCORE - 1000
}

/// Plies until the forced finish: positive when the side to move wins.
/// `None` for heuristic scores.
pub fn win_in_n(score: i32) -> Option<i32> {
    if !is_win_score(score) {
        return None;
    }
    let plies = WIN_SCORE - score.abs();
    if score > 0 {
        Some(plies)
    } else {
        Some(-plies)
    }
}

/// "W3" / "-W4" for forced finishes, signed integers otherwise.
pub fn format_score(score: i32) -> String {
    match win_in_n(score) {
        Some(n) if n > 0 => format!("W{n}"),
        Some(n) => format!("-W{}", -n),
        None if score > 0 => format!("+{score}"),
        None => score.to_string(),
    }
}

/// Re-expresses a side-to-move score from Player One's point of view.
pub fn format_score_for_display(score: i32, side_to_move: Player) -> String {
    match side_to_move {
        Player::One => format_score(score),
        Player::Two => format_score(-score),
    }
}
