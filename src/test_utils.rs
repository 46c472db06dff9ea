use crate::models::domain::{Question, QuestionBatch};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A four-answer question whose correct answer sits at `index % 4`.
    pub fn sample_question(index: usize) -> Question {
        let correct = index % 4;
        let answers = (0..4)
            .map(|slot| {
                if slot == correct {
                    format!("right {}", index)
                } else {
                    format!("wrong {}-{}", index, slot)
                }
            })
            .collect();

        Question::new(format!("Question {}?", index + 1), answers, correct)
            .expect("fixture question should be valid")
    }

    pub fn sample_batch(size: usize) -> QuestionBatch {
        QuestionBatch::new((0..size).map(sample_question).collect())
    }
}

#[cfg(test)]
pub mod test_helpers {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::mpsc::UnboundedReceiver,
        task::JoinHandle,
    };

    /// Collects everything already queued on a channel.
    pub fn drain<T>(rx: &mut UnboundedReceiver<T>) -> Vec<T> {
        let mut items = Vec::new();
        while let Ok(item) = rx.try_recv() {
            items.push(item);
        }
        items
    }

    /// Serves a single HTTP response on a local port and returns the base URL
    /// plus a task resolving to the request line it received.
    pub async fn serve_once(status: &str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind local listener");
        let addr = listener.local_addr().expect("listener address");
        let status = status.to_string();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept connection");

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = stream.read(&mut buf).await.expect("read request");
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            let _ = stream.shutdown().await;

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (format!("http://{}/api.php", addr), handle)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_sample_question() {
        let question = sample_question(6);
        assert_eq!(question.correct_index(), 2);
        assert_eq!(question.correct_answer(), "right 6");
        assert_eq!(question.answers().len(), 4);
    }

    #[test]
    fn test_fixtures_sample_batch() {
        let batch = sample_batch(10);
        assert_eq!(batch.len(), 10);
        assert_eq!(batch.get(9).map(|q| q.text()), Some("Question 10?"));
    }
}
