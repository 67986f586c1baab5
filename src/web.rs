use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>GalekPrompt - Transform Images into Perfect Gemini Prompts</title>
    <meta name="description" content="Upload any image and get an optimized prompt for Gemini Image generation.">
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: #faf9ff;
            color: #1f1d2b;
            min-height: 100vh;
            display: flex;
            flex-direction: column;
        }

        header, footer {
            background: rgba(255, 255, 255, 0.7);
            backdrop-filter: blur(6px);
            padding: 16px 24px;
        }

        header {
            border-bottom: 1px solid #ece9f7;
            display: flex;
            align-items: center;
            justify-content: space-between;
            position: sticky;
            top: 0;
        }

        .brand {
            font-size: 1.3em;
            font-weight: 700;
            background: linear-gradient(90deg, #7c3aed, #9333ea);
            -webkit-background-clip: text;
            color: transparent;
        }

        .badge {
            border: 1px solid #ddd6fe;
            border-radius: 20px;
            padding: 4px 12px;
            font-size: 0.8em;
            color: #6d28d9;
        }

        main {
            flex: 1;
            width: 100%;
            max-width: 880px;
            margin: 0 auto;
            padding: 40px 20px;
        }

        .hero { text-align: center; margin-bottom: 36px; }
        .hero h1 { font-size: 2.4em; margin-bottom: 12px; }
        .hero h1 span {
            background: linear-gradient(90deg, #7c3aed, #9333ea);
            -webkit-background-clip: text;
            color: transparent;
        }
        .hero p { color: #6b6880; max-width: 620px; margin: 0 auto; line-height: 1.6; }

        .card {
            background: white;
            border-radius: 16px;
            box-shadow: 0 10px 40px rgba(76, 29, 149, 0.08);
            padding: 28px;
            margin-bottom: 24px;
        }

        .upload-area {
            border: 2px dashed #c4b5fd;
            border-radius: 14px;
            padding: 48px 20px;
            text-align: center;
            cursor: pointer;
            transition: all 0.2s;
        }

        .upload-area:hover, .upload-area.dragover {
            border-color: #7c3aed;
            background: #f5f3ff;
        }

        .upload-icon { font-size: 3em; margin-bottom: 12px; }
        .upload-text { font-size: 1.1em; font-weight: 600; margin-bottom: 6px; }
        .upload-hint { color: #8b879e; font-size: 0.85em; }

        input[type="file"] { display: none; }

        .preview {
            display: none;
            max-width: 420px;
            width: 100%;
            margin: 24px auto 0;
            border-radius: 12px;
            box-shadow: 0 4px 15px rgba(0,0,0,0.1);
        }

        .actions { text-align: center; margin-top: 24px; }

        button {
            border: none;
            border-radius: 10px;
            padding: 12px 28px;
            font-size: 1em;
            font-weight: 600;
            cursor: pointer;
        }

        .primary {
            background: linear-gradient(90deg, #7c3aed, #9333ea);
            color: white;
            min-width: 200px;
        }

        .primary:disabled { opacity: 0.5; cursor: not-allowed; }
        .secondary { background: white; border: 1px solid #ddd6fe; color: #6d28d9; }

        .results { display: none; }

        .grid {
            display: grid;
            grid-template-columns: 1fr 1fr;
            gap: 20px;
            margin-bottom: 20px;
        }

        @media (max-width: 700px) { .grid { grid-template-columns: 1fr; } }

        .grid img { width: 100%; border-radius: 10px; }

        .analysis-row {
            display: flex;
            justify-content: space-between;
            gap: 12px;
            font-size: 0.9em;
            padding: 6px 0;
            border-bottom: 1px solid #f1effa;
        }

        .analysis-row span:first-child { color: #8b879e; }
        .analysis-row span:last-child { font-weight: 600; text-align: right; }

        textarea {
            width: 100%;
            min-height: 220px;
            border: 1px solid #e4e0f5;
            border-radius: 10px;
            padding: 14px;
            font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
            font-size: 0.85em;
            resize: none;
            margin: 12px 0;
        }

        .button-row { display: flex; gap: 10px; }
        .button-row .primary { flex: 1; }

        .tips { background: #fffbeb; border: 1px solid #fde68a; }
        .tips h3 { color: #92400e; margin-bottom: 10px; }
        .tips li { color: #78350f; margin: 6px 0 6px 18px; font-size: 0.9em; }

        .loading { display: none; text-align: center; padding: 24px; color: #6b6880; }

        .spinner {
            border: 4px solid #f3f3f3;
            border-top: 4px solid #7c3aed;
            border-radius: 50%;
            width: 44px;
            height: 44px;
            animation: spin 1s linear infinite;
            margin: 0 auto 14px;
        }

        @keyframes spin { 0% { transform: rotate(0deg); } 100% { transform: rotate(360deg); } }

        .toast {
            display: none;
            position: fixed;
            bottom: 24px;
            left: 50%;
            transform: translateX(-50%);
            padding: 12px 20px;
            border-radius: 10px;
            color: white;
            font-weight: 600;
            box-shadow: 0 6px 20px rgba(0,0,0,0.15);
        }

        .toast.success { background: #16a34a; }
        .toast.error { background: #dc2626; }

        footer {
            border-top: 1px solid #ece9f7;
            text-align: center;
            font-size: 0.85em;
            color: #8b879e;
        }
    </style>
</head>
<body>
    <header>
        <div class="brand">✨ GalekPrompt</div>
        <div class="badge">Prompts only, no image generation</div>
    </header>

    <main>
        <div class="hero">
            <h1>Transform any image into a <span>perfect Gemini prompt</span> in seconds</h1>
            <p>Sube una imagen que te guste de Instagram, Pinterest o Google, y obtén un prompt
               optimizado para recrear ese estilo visual con tu propia cara en Gemini.
               <strong>No necesitas saber escribir prompts.</strong></p>
        </div>

        <div class="card" id="uploadCard">
            <div class="upload-area" id="uploadArea">
                <div class="upload-icon">📸</div>
                <div class="upload-text" id="uploadText">Drag &amp; drop image here</div>
                <div class="upload-hint">or click to browse • Supports: JPG, PNG, WebP (max 10MB)</div>
                <input type="file" id="fileInput" accept="image/jpeg,image/png,image/webp">
            </div>
            <img id="previewImage" class="preview" alt="Preview">
            <div class="loading" id="loading">
                <div class="spinner"></div>
                <p>Analyzing with AI...</p>
            </div>
            <div class="actions">
                <button class="primary" id="analyzeButton" disabled>✨ Analyze Image</button>
            </div>
        </div>

        <div class="results" id="results">
            <div class="card" style="text-align:center">
                <h2>Your optimized prompt is ready!</h2>
                <p style="color:#6b6880;margin-top:6px">Copy this prompt and paste it into Gemini</p>
            </div>

            <div class="grid">
                <div class="card"><img id="resultImage" alt="Analyzed image"></div>
                <div class="card">
                    <h3 style="margin-bottom:10px">🖼️ Image Analysis</h3>
                    <div id="analysisRows"></div>
                </div>
            </div>

            <div class="card">
                <h3>✨ Optimized Prompt for Gemini</h3>
                <textarea id="promptText" readonly></textarea>
                <div class="button-row">
                    <button class="primary" id="copyButton">📋 Copy Prompt</button>
                    <button class="secondary" id="resetButton">🔄 Generate New</button>
                </div>
            </div>

            <div class="card tips">
                <h3>💡 Tips for best results in Gemini</h3>
                <ul id="tipsList"></ul>
            </div>
        </div>
    </main>

    <footer>
        <p>Powered by Galek</p>
        <p>© 2025 GalekPrompt</p>
    </footer>

    <div class="toast" id="toast"></div>

    <script>
        const MAX_SIZE = 10 * 1024 * 1024;
        const VALID_TYPES = ['image/jpeg', 'image/png', 'image/webp'];
        const ANALYSIS_FIELDS = [
            ['Type', 'type'],
            ['Style', 'style'],
            ['Lighting', 'lighting'],
            ['Composition', 'composition'],
            ['Colors', 'colors'],
            ['Mood', 'mood'],
            ['Realism', 'realism'],
            ['Subject', 'personDescription'],
            ['Objects', 'objectsDescription'],
            ['Environment', 'environmentDescription'],
        ];

        const uploadArea = document.getElementById('uploadArea');
        const uploadText = document.getElementById('uploadText');
        const fileInput = document.getElementById('fileInput');
        const previewImage = document.getElementById('previewImage');
        const analyzeButton = document.getElementById('analyzeButton');
        const loading = document.getElementById('loading');
        const uploadCard = document.getElementById('uploadCard');
        const results = document.getElementById('results');
        const resultImage = document.getElementById('resultImage');
        const analysisRows = document.getElementById('analysisRows');
        const promptText = document.getElementById('promptText');
        const tipsList = document.getElementById('tipsList');
        const toast = document.getElementById('toast');

        let imageDataUri = '';

        function showToast(message, kind) {
            toast.textContent = message;
            toast.className = 'toast ' + kind;
            toast.style.display = 'block';
            setTimeout(() => { toast.style.display = 'none'; }, 3500);
        }

        function handleFile(file) {
            if (!VALID_TYPES.includes(file.type)) {
                showToast('Please upload a valid image file (JPG, PNG, or WebP)', 'error');
                return;
            }
            if (file.size > MAX_SIZE) {
                showToast('File size exceeds 10MB limit', 'error');
                return;
            }

            const reader = new FileReader();
            reader.onload = (e) => {
                imageDataUri = e.target.result;
                previewImage.src = imageDataUri;
                previewImage.style.display = 'block';
                uploadText.textContent = 'Click to change image';
                analyzeButton.disabled = false;
            };
            reader.readAsDataURL(file);
        }

        uploadArea.addEventListener('click', () => fileInput.click());

        uploadArea.addEventListener('dragover', (e) => {
            e.preventDefault();
            uploadArea.classList.add('dragover');
        });

        uploadArea.addEventListener('dragleave', (e) => {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
        });

        uploadArea.addEventListener('drop', (e) => {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
            const file = e.dataTransfer.files[0];
            if (file) {
                handleFile(file);
            }
        });

        fileInput.addEventListener('change', (e) => {
            const file = e.target.files[0];
            if (file) {
                handleFile(file);
            }
        });

        function renderResult(data) {
            resultImage.src = imageDataUri;
            analysisRows.innerHTML = '';
            for (const [label, key] of ANALYSIS_FIELDS) {
                const value = data.analysis && data.analysis[key];
                if (!value) continue;
                const row = document.createElement('div');
                row.className = 'analysis-row';
                const name = document.createElement('span');
                name.textContent = label + ':';
                const text = document.createElement('span');
                text.textContent = value;
                row.append(name, text);
                analysisRows.appendChild(row);
            }

            promptText.value = data.prompt;

            tipsList.innerHTML = '';
            for (const tip of data.tips || []) {
                const item = document.createElement('li');
                item.textContent = tip;
                tipsList.appendChild(item);
            }

            uploadCard.style.display = 'none';
            results.style.display = 'block';
        }

        analyzeButton.addEventListener('click', async () => {
            if (!imageDataUri) {
                showToast('Please select an image first', 'error');
                return;
            }

            analyzeButton.disabled = true;
            loading.style.display = 'block';

            try {
                const response = await fetch('/api/analyze', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ image: imageDataUri }),
                });

                const data = await response.json();
                if (!response.ok || !data.success) {
                    throw new Error(data.error || 'Failed to analyze image');
                }

                renderResult(data);
                showToast('✨ Your optimized prompt is ready!', 'success');
            } catch (error) {
                showToast(error.message || 'Oops! Something went wrong. Please try again.', 'error');
            } finally {
                loading.style.display = 'none';
                analyzeButton.disabled = !imageDataUri;
            }
        });

        document.getElementById('copyButton').addEventListener('click', async () => {
            try {
                await navigator.clipboard.writeText(promptText.value);
                showToast('Prompt copied to clipboard!', 'success');
            } catch (error) {
                showToast('Failed to copy prompt', 'error');
            }
        });

        document.getElementById('resetButton').addEventListener('click', () => {
            imageDataUri = '';
            fileInput.value = '';
            previewImage.style.display = 'none';
            uploadText.textContent = 'Drag & drop image here';
            analyzeButton.disabled = true;
            results.style.display = 'none';
            uploadCard.style.display = 'block';
        });
    </script>
</body>
</html>
"#;
