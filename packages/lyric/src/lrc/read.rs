use nom::{
    AsChar, IResult, Parser,
    bytes::complete::{tag, take_while_m_n},
    combinator::{map_res, opt, recognize},
    sequence::delimited,
};

use crate::{DEFAULT_TAIL, Segment};

fn ascii_to_f64(digits: &[u8]) -> Result<f64, std::num::ParseFloatError> {
    String::from_utf8_lossy(digits).parse()
}

fn parse_two_digits(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while_m_n(2, 2, |x: u8| x.is_dec_digit())(input)
}

pub fn parse_minutes(input: &[u8]) -> IResult<&[u8], f64> {
    map_res(parse_two_digits, ascii_to_f64).parse(input)
}

// SS, SS.f or SS.ff
pub fn parse_seconds(input: &[u8]) -> IResult<&[u8], f64> {
    map_res(
        recognize((
            parse_two_digits,
            opt((
                tag(b".".as_slice()),
                take_while_m_n(1, 2, |x: u8| x.is_dec_digit()),
            )),
        )),
        ascii_to_f64,
    )
    .parse(input)
}

/// Parses a bracketed `[MM:SS]`, `[MM:SS.f]` or `[MM:SS.ff]` timestamp into
/// seconds, leaving whatever follows the closing bracket.
pub fn parse_lrc_timestamp(input: &[u8]) -> IResult<&[u8], f64> {
    let (input, (minutes, _, seconds)) = delimited(
        tag(b"[".as_slice()),
        (parse_minutes, tag(b":".as_slice()), parse_seconds),
        tag(b"]".as_slice()),
    )
    .parse(input)?;
    Ok((input, minutes * 60.0 + seconds))
}

// 取行内第一个能解析的时间戳，前面的内容直接丢弃
fn parse_line(line: &str) -> Option<(f64, &str)> {
    line.match_indices('[').find_map(|(at, _)| {
        let (rest, start) = parse_lrc_timestamp(&line.as_bytes()[at..]).ok()?;
        // 时间戳只包含 ASCII 字符，按字节偏移切分是安全的
        let text = &line[line.len() - rest.len()..];
        Some((start, text.trim()))
    })
}

/// Parses LRC text into segments sorted by start time.
///
/// A line is keyed by the first timestamp found anywhere in it. Blank lines
/// and lines without a timestamp are dropped rather than reported. Each segment ends where the next one starts; the
/// last one is given [`DEFAULT_TAIL`] seconds.
pub fn parse_lrc(src: &str) -> Vec<Segment> {
    let mut entries: Vec<(f64, &str)> = Vec::new();

    for line in src.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match parse_line(line) {
            Some(entry) => entries.push(entry),
            None => {
                #[cfg(feature = "tracing")]
                tracing::trace!("skipping line without timestamp: {line:?}");
            }
        }
    }

    entries.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut result = Vec::with_capacity(entries.len());
    for (i, (start, text)) in entries.iter().enumerate() {
        let end = match entries.get(i + 1) {
            Some((next_start, _)) => *next_start,
            None => start + DEFAULT_TAIL,
        };
        result.push(Segment::new(*start, end, *text));
    }
    result
}

#[test]
fn test_lrc_timestamp() {
    assert_eq!(parse_lrc_timestamp(b"[00:05]"), Ok((b"".as_slice(), 5.0)));
    assert_eq!(parse_lrc_timestamp(b"[01:02.5]"), Ok((b"".as_slice(), 62.5)));
    assert_eq!(
        parse_lrc_timestamp(b"[02:10.25]text"),
        Ok((b"text".as_slice(), 130.25))
    );
    assert_eq!(
        parse_lrc_timestamp(b"[00:00.05]"),
        Ok((b"".as_slice(), 0.05))
    );
    assert!(parse_lrc_timestamp(b"[0:05]").is_err());
    assert!(parse_lrc_timestamp(b"[00:5]").is_err());
    assert!(parse_lrc_timestamp(b"[00:05.123]").is_err());
    assert!(parse_lrc_timestamp(b"[00:05.]").is_err());
    assert!(parse_lrc_timestamp(b"[ar:someone]").is_err());
}

#[test]
fn test_parse_lrc_sorts_and_links() {
    let segments = parse_lrc("[00:05.00]a\n[00:00.00]b");
    assert_eq!(
        segments,
        vec![Segment::new(0.0, 5.0, "b"), Segment::new(5.0, 10.0, "a")]
    );
}

#[test]
fn test_parse_lrc_is_gapless() {
    const TEST_LRC: &str = "[ti:Test Song]
[ar:Someone]

[00:12.00]Line one
[00:17.20]Line two
  [00:21.10]  Line three
[00:24.00]
[00:28.25]Line five";
    let segments = parse_lrc(TEST_LRC);
    assert_eq!(segments.len(), 5);
    for pair in segments.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
        assert!(pair[0].start <= pair[1].start);
    }
    let last = segments.last().unwrap();
    assert_eq!(last.end, last.start + DEFAULT_TAIL);
    assert_eq!(segments[2].text, "Line three");
    assert_eq!(segments[3].text, "");
}

#[test]
fn test_parse_lrc_skips_malformed() {
    assert!(parse_lrc("no timestamp here").is_empty());
    assert!(parse_lrc("").is_empty());
    assert!(parse_lrc("\n\n   \n").is_empty());

    let segments = parse_lrc("garbage\n[00:01.5]ok\n[1:00]bad\n[00:03]also ok\n");
    assert_eq!(
        segments,
        vec![
            Segment::new(1.5, 3.0, "ok"),
            Segment::new(3.0, 8.0, "also ok"),
        ]
    );
}

#[test]
fn test_parse_lrc_single_line_gets_tail() {
    let segments = parse_lrc("[01:00]only");
    assert_eq!(segments, vec![Segment::new(60.0, 65.0, "only")]);
}

#[test]
fn test_parse_lrc_crlf_and_repeated_stamps() {
    // 同一行多个时间戳时，只取第一个，剩余部分作为文本
    let segments = parse_lrc("[00:02]x\r\n[00:01][00:04]chorus\r\n");
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0], Segment::new(1.0, 2.0, "[00:04]chorus"));
    assert_eq!(segments[1], Segment::new(2.0, 7.0, "x"));
}

#[test]
fn test_parse_lrc_finds_stamp_mid_line() {
    let segments = parse_lrc("[offset:0][00:01.00]a\nverse [00:03]b\n[00:05.123][00:06]c");
    assert_eq!(
        segments,
        vec![
            Segment::new(1.0, 3.0, "a"),
            Segment::new(3.0, 6.0, "b"),
            Segment::new(6.0, 11.0, "c"),
        ]
    );
    assert!(parse_lrc("[ar:x] [1:00] [00:5]").is_empty());
}

#[test]
fn test_parse_sample_file() {
    const SAMPLE_LRC: &str = include_str!("../../test/sample.lrc");
    let segments = parse_lrc(SAMPLE_LRC);
    assert_eq!(segments.len(), 6);
    assert_eq!(segments[0].start, 3.2);
    assert_eq!(segments[2].start, 16.4);
    assert_eq!(segments[4].text, "");
    assert_eq!(segments[4].end, 31.1);
    assert_eq!(segments[5].end, segments[5].start + DEFAULT_TAIL);
}
