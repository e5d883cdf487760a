//! Prompt construction for players and judges.
//!
//! Players see only their own word and the shared transcript; judges
//! additionally see both words of the pair.

use undercover_core::{EvalDimension, ParticipantId};

pub fn player_speak_system() -> &'static str {
    r#"You are an AI player in a hidden-word social deduction game.

# Game rules
1. Each player receives a word. The majority share the same word; a small minority receive a different but related word.
2. Players take turns describing their word in one sentence without saying the word itself.
3. After a round of statements, players vote for who they believe holds the different word. The player with the most votes is eliminated.
4. If every minority player is eliminated, the majority wins; if the minority reaches parity with the majority, the minority wins.

# Statement requirements
1. One brief descriptive sentence, not an essay.
2. Do not repeat statements other players already made.
3. The description may be broad or specific, but it must truthfully match your word.

# Your task
1. From your word and the transcript, infer which side you are likely on.
2. Produce a statement that protects you and advances your side's goal.

# Output
Respond with JSON only, in this shape:
{
  "identity": "your analysis of your own and other players' likely sides",
  "strategy": "your reasoning for this statement",
  "statement": "your one-sentence statement (must not contain your word or your analysis)"
}

# Strategy hints
- Early on, or while your side is unclear, stay vague and broad.
- If you appear to be in the majority, gradually narrow the word down to expose the minority.
- If you appear to be in the minority, keep your descriptions ambiguous enough to fit both words."#
}

pub fn player_speak_user(
    participant: ParticipantId,
    own_concept: &str,
    transcript: &str,
    last_analysis: &str,
) -> String {
    format!(
        r#"Here is the information for this turn.
# Your personal information:
You are player_{participant}, your word is "{own_concept}".
# Statement history for this game:
{transcript}
# Your identity analysis from your previous turn:
{last_analysis}"#
    )
}

pub fn player_vote_system() -> &'static str {
    r#"You are an AI player in a hidden-word social deduction game. A voting round has started: analyze the transcript, infer which side you are on, and vote to eliminate one player.

# Game rules
1. Each player receives a word. The majority share the same word; a small minority receive a different but related word.
2. After a round of statements, players vote for who they believe holds the different word. The player with the most votes is eliminated.
3. If every minority player is eliminated, the majority wins; if the minority reaches parity with the majority, the minority wins.

# Output
Respond with JSON only, in this shape:
{
  "identity": "your analysis of your identity",
  "strategy": "your voting reasoning",
  "vote": "the id of the player you vote for (a bare number, no extra text)"
}"#
}

pub fn player_vote_user(
    participant: ParticipantId,
    own_concept: &str,
    transcript: &str,
    last_analysis: &str,
    active: &[ParticipantId],
) -> String {
    let active_list = active
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"Here is the information for this voting round.
# Your personal information:
You are player_{participant}, your word is "{own_concept}".
# Statement history for this game:
{transcript}
# Your identity analysis from your previous turn:
{last_analysis}
# Currently surviving players:
[{active_list}]
You must choose one number from this list as your vote."#
    )
}

pub fn judge_system() -> &'static str {
    r#"You are the referee for a hidden-word social deduction game. Score each player statement on three dimensions, each limited to the values 0, 0.2, 0.4, 0.6, 0.8, 1.

1. Novelty: whether the statement repeats earlier statements.
   0 = a complete repetition, 1 = an entirely new perspective.
2. Relevance: how specifically the statement points to the player's word.
   0 = irrelevant, 0.2 = extremely broad, 1 = almost names the word.
3. Reasonableness: how sound the association between statement and word is.
   0 = no possible association, 0.2 = extremely far-fetched, 1 = a perfect match.

Respond with JSON only, in this shape:
{
  "novelty": { "score": 0.8, "explanation": "..." },
  "relevance": { "score": 0.6, "explanation": "..." },
  "reasonableness": { "score": 1.0, "explanation": "..." }
}"#
}

pub fn judge_user(
    own_concept: &str,
    other_concept: &str,
    statement: &str,
    transcript: &str,
) -> String {
    format!(
        r#"Please evaluate the following player statement.
# Player information:
Player's word: "{own_concept}"
The other word in this game: "{other_concept}"
Player's statement: "{statement}"

# Historical statements:
{transcript}"#
    )
}

pub fn binary_judge_system(dimension: EvalDimension) -> String {
    let criterion = match dimension {
        EvalDimension::Reasonableness => {
            "whether the statement is an unreasonable description of the player's word \
             (no sound association can be made between them)"
        }
        EvalDimension::Novelty => {
            "whether the statement merely repeats earlier statements without adding \
             new information"
        }
    };
    format!(
        r#"You are a referee for a hidden-word social deduction game, ruling on a single question: {criterion}.

Respond with JSON only, in this shape:
{{
  "verdict": 1,
  "explanation": "..."
}}
A verdict of 1 means the player should be eliminated for failing this criterion; 0 means they pass."#
    )
}
