use crate::SourceBuffer;

#[test]
fn sentinel_follows_source() {
    let buf = SourceBuffer::new("my $x;");
    assert_eq!(buf.len(), 6);
    let mut cursor = buf.cursor();
    cursor.advance_n(6);
    assert!(cursor.is_eof());
    assert_eq!(cursor.current(), 0);
    assert_eq!(cursor.peek(), 0);
}

#[test]
fn empty_source() {
    let buf = SourceBuffer::new("");
    assert!(buf.is_empty());
    assert!(buf.cursor().is_eof());
}

#[test]
fn interior_nul_is_not_eof() {
    let buf = SourceBuffer::new("a\0b");
    let mut cursor = buf.cursor();
    cursor.advance();
    assert_eq!(cursor.current(), 0);
    assert!(!cursor.is_eof());
}

#[test]
fn bom_detection() {
    assert_eq!(SourceBuffer::new("\u{FEFF}print 1;").bom_len(), 3);
    assert_eq!(SourceBuffer::new("print 1;").bom_len(), 0);
}

#[test]
fn cursor_at_clamps() {
    let buf = SourceBuffer::new("abc");
    assert_eq!(buf.cursor_at(1).current(), b'b');
    assert!(buf.cursor_at(99).is_eof());
}
