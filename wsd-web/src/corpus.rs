//! # Corpus de Sentidos em Português Brasileiro
//!
//! Corpus anotado manualmente para treinamento e demonstração da
//! desambiguação. Cada exemplo é uma sentença contendo a palavra-alvo de um
//! lexelt, rotulada com o sentido correto naquele contexto.
//!
//! ## Palavras-Alvo Cobertas
//! - **banco**: instituição financeira vs. assento
//! - **banco de dados**: expressão multipalavra (informática)
//! - **manga**: fruta vs. parte da camisa
//! - **vela**: iluminação, navegação ou peça do motor
//! - **cabo**: parte de ferramenta, acidente geográfico ou patente militar
//!
//! O rótulo reservado `"U"` marca ocorrências cujo sentido o anotador não
//! conseguiu decidir; elas treinam a classe desconhecida que o resolvedor
//! descarta na saída.

/// Um exemplo de treinamento: uma sentença com a palavra-alvo rotulada.
pub struct TrainingExample {
    /// Lexelt da ocorrência (ex.: `"banco.n"`).
    pub lexelt: &'static str,
    /// Sentido anotado, ou `"U"` para ocorrência indecidível.
    pub sense: &'static str,
    /// A sentença completa, sem tokenização prévia.
    pub text: &'static str,
}

/// Entrada do inventário de sentidos, com a glosa exibida na interface.
pub struct SenseEntry {
    pub lexelt: &'static str,
    pub sense: &'static str,
    pub gloss: &'static str,
}

/// Retorna o corpus de treinamento completo em PT-BR
pub fn get_corpus() -> Vec<TrainingExample> {
    vec![
        // ===== BANCO (instituição financeira) =====
        TrainingExample {
            lexelt: "banco.n",
            sense: "financeiro",
            text: "O banco aprovou o empréstimo depois de revisar a conta do cliente.",
        },
        TrainingExample {
            lexelt: "banco.n",
            sense: "financeiro",
            text: "A agência do banco cobra juros altos em qualquer empréstimo pessoal.",
        },
        TrainingExample {
            lexelt: "banco.n",
            sense: "financeiro",
            text: "Ela abriu uma conta no banco para receber o salário todo mês.",
        },
        TrainingExample {
            lexelt: "banco.n",
            sense: "financeiro",
            text: "O gerente do banco explicou as taxas de juros da poupança.",
        },
        // ===== BANCO (assento) =====
        TrainingExample {
            lexelt: "banco.n",
            sense: "assento",
            text: "Sentamos no banco de madeira da praça para ver o pôr do sol.",
        },
        TrainingExample {
            lexelt: "banco.n",
            sense: "assento",
            text: "O jardim do parque tem um banco antigo debaixo da árvore.",
        },
        TrainingExample {
            lexelt: "banco.n",
            sense: "assento",
            text: "O carpinteiro lixou o banco de madeira antes de pintar o jardim.",
        },
        TrainingExample {
            lexelt: "banco.n",
            sense: "assento",
            text: "As crianças pularam do banco da praça e correram pelo parque.",
        },
        // ===== BANCO DE DADOS (expressão multipalavra) =====
        TrainingExample {
            lexelt: "banco_de_dados.n",
            sense: "informatica",
            text: "O servidor grava cada pedido no banco de dados relacional da empresa.",
        },
        TrainingExample {
            lexelt: "banco_de_dados.n",
            sense: "informatica",
            text: "A consulta ao banco de dados demorou porque faltava um índice.",
        },
        TrainingExample {
            lexelt: "banco_de_dados.n",
            sense: "informatica",
            text: "Fizemos o backup do banco de dados antes de migrar o sistema.",
        },
        // ===== MANGA (fruta) =====
        TrainingExample {
            lexelt: "manga.n",
            sense: "fruta",
            text: "O suco de manga madura é a sobremesa preferida do almoço.",
        },
        TrainingExample {
            lexelt: "manga.n",
            sense: "fruta",
            text: "Colhemos manga verde do pé para fazer doce com calda.",
        },
        TrainingExample {
            lexelt: "manga.n",
            sense: "fruta",
            text: "A árvore do quintal deu manga doce o verão inteiro.",
        },
        // ===== MANGA (parte da camisa) =====
        TrainingExample {
            lexelt: "manga.n",
            sense: "vestuario",
            text: "Ele dobrou a manga da camisa antes de lavar a louça.",
        },
        TrainingExample {
            lexelt: "manga.n",
            sense: "vestuario",
            text: "A costureira ajustou a manga comprida do casaco de inverno.",
        },
        TrainingExample {
            lexelt: "manga.n",
            sense: "vestuario",
            text: "Prefiro camisa de manga curta no calor do verão.",
        },
        // ===== VELA (iluminação) =====
        TrainingExample {
            lexelt: "vela.n",
            sense: "iluminacao",
            text: "Durante o apagão acendemos uma vela na cozinha para jantar.",
        },
        TrainingExample {
            lexelt: "vela.n",
            sense: "iluminacao",
            text: "A vela do bolo de aniversário apagou com o vento da janela.",
        },
        TrainingExample {
            lexelt: "vela.n",
            sense: "iluminacao",
            text: "A luz da vela acesa tremia no castiçal da mesa.",
        },
        // ===== VELA (navegação) =====
        TrainingExample {
            lexelt: "vela.n",
            sense: "nautica",
            text: "O marinheiro içou a vela do barco quando o vento virou.",
        },
        TrainingExample {
            lexelt: "vela.n",
            sense: "nautica",
            text: "A vela branca do veleiro apareceu no horizonte da baía.",
        },
        TrainingExample {
            lexelt: "vela.n",
            sense: "nautica",
            text: "Sem vento no mastro, a vela do barco ficou murcha a tarde toda.",
        },
        // ===== VELA (peça do motor) =====
        TrainingExample {
            lexelt: "vela.n",
            sense: "motor",
            text: "O mecânico trocou a vela de ignição do motor do carro.",
        },
        TrainingExample {
            lexelt: "vela.n",
            sense: "motor",
            text: "O carro falhava porque a vela do motor estava carbonizada.",
        },
        TrainingExample {
            lexelt: "vela.n",
            sense: "motor",
            text: "A oficina cobrou barato para trocar a vela queimada do motor.",
        },
        // ===== CABO (parte de ferramenta) =====
        TrainingExample {
            lexelt: "cabo.n",
            sense: "ferramenta",
            text: "O cabo de madeira da vassoura quebrou durante a limpeza.",
        },
        TrainingExample {
            lexelt: "cabo.n",
            sense: "ferramenta",
            text: "A faca nova tem cabo de madeira encerada.",
        },
        TrainingExample {
            lexelt: "cabo.n",
            sense: "ferramenta",
            text: "Ele apertou o cabo do martelo antes de pregar a tábua.",
        },
        // ===== CABO (acidente geográfico) =====
        TrainingExample {
            lexelt: "cabo.n",
            sense: "geografia",
            text: "O navio contornou o cabo rochoso na entrada da baía.",
        },
        TrainingExample {
            lexelt: "cabo.n",
            sense: "geografia",
            text: "O farol fica no alto do cabo que avança sobre o mar.",
        },
        TrainingExample {
            lexelt: "cabo.n",
            sense: "geografia",
            text: "A expedição mapeou o litoral do cabo até a enseada.",
        },
        // ===== CABO (ocorrências indecidíveis) =====
        TrainingExample {
            lexelt: "cabo.n",
            sense: "U",
            text: "O relatório menciona o cabo duas vezes sem dar contexto nenhum.",
        },
        TrainingExample {
            lexelt: "cabo.n",
            sense: "U",
            text: "Ninguém soube dizer qual cabo aparece na foto antiga.",
        },
    ]
}

/// Inventário de sentidos com as glosas exibidas na interface
pub fn sense_inventory() -> Vec<SenseEntry> {
    vec![
        SenseEntry { lexelt: "banco.n", sense: "financeiro", gloss: "instituição financeira" },
        SenseEntry { lexelt: "banco.n", sense: "assento", gloss: "assento para sentar" },
        SenseEntry { lexelt: "banco_de_dados.n", sense: "informatica", gloss: "sistema de armazenamento de dados" },
        SenseEntry { lexelt: "manga.n", sense: "fruta", gloss: "fruto da mangueira" },
        SenseEntry { lexelt: "manga.n", sense: "vestuario", gloss: "parte da roupa que cobre o braço" },
        SenseEntry { lexelt: "vela.n", sense: "iluminacao", gloss: "cilindro de cera com pavio" },
        SenseEntry { lexelt: "vela.n", sense: "nautica", gloss: "pano que impulsiona embarcações" },
        SenseEntry { lexelt: "vela.n", sense: "motor", gloss: "peça de ignição do motor" },
        SenseEntry { lexelt: "cabo.n", sense: "ferramenta", gloss: "parte por onde se segura um utensílio" },
        SenseEntry { lexelt: "cabo.n", sense: "geografia", gloss: "ponta de terra que avança sobre o mar" },
    ]
}

/// Glosa de um sentido, ou `None` para sentidos fora do inventário (como `"U"`)
pub fn sense_gloss(lexelt: &str, sense: &str) -> Option<&'static str> {
    sense_inventory()
        .into_iter()
        .find(|entry| entry.lexelt == lexelt && entry.sense == sense)
        .map(|entry| entry.gloss)
}

/// Textos de demonstração para a interface web
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Tecnologia",
            "A equipe migrou o banco de dados para um servidor novo depois que o banco aprovou o empréstimo do projeto. A consulta ficou rápida e a conta da empresa cobriu os juros.",
        ),
        (
            "Cotidiano",
            "Ela dobrou a manga da camisa, cortou uma manga madura para o suco e sentou no banco de madeira da praça.",
        ),
        (
            "Navegação",
            "O marinheiro içou a vela quando o vento virou na baía, e à noite acendemos uma vela na cabine durante o apagão.",
        ),
        (
            "Ambíguo",
            "O cabo aparece no relatório sem contexto nenhum, mas o cabo de madeira da vassoura ficou na foto.",
        ),
    ]
}
