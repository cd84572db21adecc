//! The single-page chat UI served at `GET /`.
//!
//! The page keeps no state of its own beyond the session cookie. It reloads
//! the transcript from `/api/session` and posts each prompt to `/api/turn`.

pub const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Agent Chat</title>
  <style>
    * { box-sizing: border-box; }
    body { margin: 0; font-family: system-ui, sans-serif; display: grid; grid-template-columns: 1fr 280px; height: 100vh; }
    main { display: flex; flex-direction: column; min-height: 0; }
    #messages { flex: 1; overflow-y: auto; padding: 16px; }
    .message { margin: 0 0 12px; padding: 8px 12px; border-radius: 8px; max-width: 80ch; }
    .message.user { background: #eef2ff; margin-left: auto; }
    .message.assistant { background: #f8fafc; }
    .message.error { background: #fef2f2; color: #991b1b; }
    .caption { font-size: 12px; color: #64748b; margin-top: 4px; }
    form { display: flex; gap: 8px; padding: 12px 16px; border-top: 1px solid #e2e8f0; }
    #prompt { flex: 1; padding: 8px; }
    aside { border-left: 1px solid #e2e8f0; padding: 16px; overflow-y: auto; font-size: 14px; }
    #init-error { display: none; background: #fef2f2; color: #991b1b; padding: 8px; border-radius: 6px; }
    #debug pre { white-space: pre-wrap; font-size: 12px; }
    #reset { display: none; }
  </style>
</head>
<body>
  <main>
    <div id="messages"></div>
    <form id="chat-form">
      <input id="prompt" autocomplete="off" placeholder="Type your message...">
      <button type="submit">Send</button>
    </form>
  </main>
  <aside>
    <h3>Status</h3>
    <p id="status">Loading...</p>
    <div id="init-error"></div>
    <p><button id="reset" type="button">Reset Conversation</button></p>
    <details id="debug">
      <summary>Debug info</summary>
      <pre id="debug-detail">No errors yet.</pre>
    </details>
    <p class="caption" id="session-id"></p>
  </aside>
  <script>
    const messages = document.getElementById("messages");
    const form = document.getElementById("chat-form");
    const prompt = document.getElementById("prompt");
    const statusLine = document.getElementById("status");
    const initError = document.getElementById("init-error");
    const resetButton = document.getElementById("reset");
    const debugDetail = document.getElementById("debug-detail");
    const sessionId = document.getElementById("session-id");
    let agentReady = true;

    function addMessage(message) {
      const node = document.createElement("div");
      node.className = "message " + message.role + (message.error ? " error" : "");
      if (message.html !== undefined) {
        node.innerHTML = message.html;
      } else {
        node.textContent = message.content;
      }
      messages.appendChild(node);
      messages.scrollTop = messages.scrollHeight;
      return node;
    }

    function showStatus(status) {
      if (status.variant === "embedded") {
        const state = status.responder.state;
        agentReady = state === "ready";
        if (state === "ready") {
          statusLine.textContent = "Agent ready (" + status.responder.profile.responder_id + ")";
        } else if (state === "failed") {
          statusLine.textContent = "Agent failed to initialize";
        } else {
          statusLine.textContent = "Agent not initialized";
        }
      } else if (status.service.state === "available") {
        statusLine.textContent = "API available at " + status.endpoint;
      } else {
        statusLine.textContent = "API unavailable: " + status.service.reason;
      }
    }

    function showInitError(text) {
      initError.style.display = text ? "block" : "none";
      initError.textContent = text ? text + ". Check logs and configuration." : "";
    }

    async function loadSession() {
      statusLine.textContent = "Initializing agent...";
      const response = await fetch("/api/session");
      const view = await response.json();
      messages.innerHTML = "";
      view.messages.forEach(addMessage);
      showStatus(view.status);
      showInitError(view.init_error);
      resetButton.style.display = view.reset_enabled ? "inline-block" : "none";
      sessionId.textContent = "Session: " + view.session.session_id;
    }

    form.addEventListener("submit", async (event) => {
      event.preventDefault();
      const text = prompt.value;
      if (!text.trim()) {
        return;
      }
      prompt.value = "";
      addMessage({ role: "user", content: text, error: false });
      const pending = agentReady
        ? "Thinking..."
        : "Agent not initialized, attempting to initialize...";
      const placeholder = addMessage({ role: "assistant", content: pending, error: false });

      try {
        const response = await fetch("/api/turn", {
          method: "POST",
          headers: { "content-type": "application/json" },
          body: JSON.stringify({ text }),
        });
        const view = await response.json();
        if (!response.ok) {
          placeholder.textContent = "Error: " + view.error;
          placeholder.classList.add("error");
          return;
        }
        placeholder.innerHTML = view.reply.html;
        if (view.failed) {
          placeholder.classList.add("error");
        }
        if (view.initialized_inline && !view.failed) {
          const caption = document.createElement("div");
          caption.className = "caption";
          caption.textContent = "Agent initialized";
          placeholder.appendChild(caption);
        }
        if (view.elapsed_caption) {
          const caption = document.createElement("div");
          caption.className = "caption";
          caption.textContent = view.elapsed_caption;
          placeholder.appendChild(caption);
        }
        if (view.debug_detail) {
          debugDetail.textContent = view.debug_detail;
        }
        const status = await (await fetch("/api/status")).json();
        showStatus(status);
        showInitError(status.variant === "embedded" && status.responder.state === "failed"
          ? status.responder.error : null);
      } catch (error) {
        placeholder.textContent = "Error: " + error;
        placeholder.classList.add("error");
      }
    });

    resetButton.addEventListener("click", async () => {
      await fetch("/api/reset", { method: "POST" });
      debugDetail.textContent = "No errors yet.";
      await loadSession();
    });

    loadSession();
  </script>
</body>
</html>
"##;
