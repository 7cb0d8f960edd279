//! Newline-delimited framing over a byte stream.
//!
//! A message on the wire is its text followed by `'\n'`. Readers tolerate a
//! `'\r'` before the newline. No maximum line length is enforced, so a peer
//! that never sends a newline makes the reader buffer without bound.

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf,
};

use crate::domain::ConnectionError;

const DELIMITER: u8 = b'\n';
const CARRIAGE_RETURN: u8 = b'\r';

/// Read half of a framed connection.
pub struct FramedReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FramedReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: Vec::new(),
        }
    }

    /// Read the next message, without its delimiter.
    ///
    /// Suspends until a full line is buffered. Invalid UTF-8 is replaced
    /// rather than rejected.
    ///
    /// # Errors
    ///
    /// - [`ConnectionError::Closed`] if the stream ends, including in the
    ///   middle of an unterminated line
    /// - [`ConnectionError::Io`] on transport failure
    pub async fn read_message(&mut self) -> Result<String, ConnectionError> {
        self.buf.clear();
        let read = self.reader.read_until(DELIMITER, &mut self.buf).await?;
        if read == 0 || self.buf.last() != Some(&DELIMITER) {
            return Err(ConnectionError::Closed);
        }

        self.buf.pop();
        if self.buf.last() == Some(&CARRIAGE_RETURN) {
            self.buf.pop();
        }

        Ok(String::from_utf8_lossy(&self.buf).into_owned())
    }
}

/// Write half of a framed connection.
pub struct FramedWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> FramedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write `message` followed by the delimiter and flush.
    ///
    /// The frame is written in one buffer so a message is never interleaved
    /// with another on the wire.
    pub async fn write_message(&mut self, message: &str) -> Result<(), ConnectionError> {
        let mut frame = Vec::with_capacity(message.len() + 1);
        frame.extend_from_slice(message.as_bytes());
        frame.push(DELIMITER);

        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Shut down the write direction of the stream.
    pub async fn shutdown(&mut self) -> Result<(), ConnectionError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// A bidirectional stream with newline framing in both directions.
///
/// Use [`FramedConnection::into_split`] when reading and writing must be
/// able to suspend independently.
pub struct FramedConnection<S> {
    reader: FramedReader<ReadHalf<S>>,
    writer: FramedWriter<WriteHalf<S>>,
}

impl<S: AsyncRead + AsyncWrite> FramedConnection<S> {
    pub fn new(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader: FramedReader::new(reader),
            writer: FramedWriter::new(writer),
        }
    }

    pub async fn read_message(&mut self) -> Result<String, ConnectionError> {
        self.reader.read_message().await
    }

    pub async fn write_message(&mut self, message: &str) -> Result<(), ConnectionError> {
        self.writer.write_message(message).await
    }

    pub fn into_split(self) -> (FramedReader<ReadHalf<S>>, FramedWriter<WriteHalf<S>>) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_write_then_read_message() {
        // テスト項目: 書き込んだメッセージが区切り文字なしで読み出される
        // given (前提条件):
        let (client, server) = duplex(1024);
        let mut client = FramedConnection::new(client);
        let mut server = FramedConnection::new(server);

        // when (操作):
        client.write_message("hello").await.unwrap();
        let received = server.read_message().await;

        // then (期待する結果):
        assert_eq!(received.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_read_strips_carriage_return() {
        // テスト項目: 改行直前の CR は取り除かれる
        // given (前提条件):
        let (mut client, server) = duplex(1024);
        let mut reader = FramedReader::new(server);

        // when (操作):
        client.write_all(b"hello\r\n").await.unwrap();
        let received = reader.read_message().await;

        // then (期待する結果):
        assert_eq!(received.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_read_multiple_messages_from_one_chunk() {
        // テスト項目: 1 回の書き込みに含まれる複数行を順番に読み出せる
        // given (前提条件):
        let (mut client, server) = duplex(1024);
        let mut reader = FramedReader::new(server);

        // when (操作):
        client.write_all(b"one\ntwo\n\nthree\n").await.unwrap();

        // then (期待する結果):
        assert_eq!(reader.read_message().await.unwrap(), "one");
        assert_eq!(reader.read_message().await.unwrap(), "two");
        assert_eq!(reader.read_message().await.unwrap(), "");
        assert_eq!(reader.read_message().await.unwrap(), "three");
    }

    #[tokio::test]
    async fn test_read_closed_stream_returns_closed() {
        // テスト項目: 相手が切断した場合 Closed エラーになる
        // given (前提条件):
        let (client, server) = duplex(1024);
        let mut reader = FramedReader::new(server);

        // when (操作):
        drop(client);
        let result = reader.read_message().await;

        // then (期待する結果):
        assert!(matches!(result, Err(ConnectionError::Closed)));
    }

    #[tokio::test]
    async fn test_read_unterminated_line_at_eof_returns_closed() {
        // テスト項目: 改行で終わらないまま切断された行は捨てられ Closed になる
        // given (前提条件):
        let (mut client, server) = duplex(1024);
        let mut reader = FramedReader::new(server);

        // when (操作):
        client.write_all(b"complete\npartial").await.unwrap();
        drop(client);

        // then (期待する結果):
        assert_eq!(reader.read_message().await.unwrap(), "complete");
        assert!(matches!(
            reader.read_message().await,
            Err(ConnectionError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_read_invalid_utf8_is_replaced() {
        // テスト項目: 不正な UTF-8 は置換文字に変換され、接続はエラーにならない
        // given (前提条件):
        let (mut client, server) = duplex(1024);
        let mut reader = FramedReader::new(server);

        // when (操作):
        client.write_all(b"caf\xff\n").await.unwrap();
        let received = reader.read_message().await.unwrap();

        // then (期待する結果):
        assert_eq!(received, "caf\u{FFFD}");
    }

    #[tokio::test]
    async fn test_write_to_closed_stream_returns_io_error() {
        // テスト項目: 相手が切断済みの場合、書き込みは Io エラーになる
        // given (前提条件):
        let (client, server) = duplex(1024);
        let mut writer = FramedWriter::new(server);

        // when (操作):
        drop(client);
        let result = writer.write_message("hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(ConnectionError::Io(_))));
    }

    #[tokio::test]
    async fn test_split_halves_work_independently() {
        // テスト項目: 分割した読み書きの半分がそれぞれ独立して動作する
        // given (前提条件):
        let (client, server) = duplex(1024);
        let mut client = FramedConnection::new(client);
        let (mut reader, mut writer) = FramedConnection::new(server).into_split();

        // when (操作):
        writer.write_message("from server").await.unwrap();
        client.write_message("from client").await.unwrap();

        // then (期待する結果):
        assert_eq!(client.read_message().await.unwrap(), "from server");
        assert_eq!(reader.read_message().await.unwrap(), "from client");
    }
}
